//! Reporter configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Controls queue sizing, batching, flush cadence, and the delivery target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Delivery endpoint for event batches.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Interval between periodic flushes, milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Maximum envelopes per transmitted batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum envelopes held in the queue; the oldest is dropped beyond
    /// this.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Verbose per-batch diagnostics. Observability only, no behavioral
    /// effect.
    #[serde(default)]
    pub debug: bool,
}

fn default_endpoint() -> String {
    "/t".to_string()
}

fn default_flush_interval_ms() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    10
}

fn default_queue_capacity() -> usize {
    1000
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            flush_interval_ms: default_flush_interval_ms(),
            batch_size: default_batch_size(),
            queue_capacity: default_queue_capacity(),
            debug: false,
        }
    }
}

impl ReporterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "flush_interval_ms must be positive".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue_capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReporterConfig::default();
        assert_eq!(config.endpoint, "/t");
        assert_eq!(config.flush_interval_ms, 1000);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.queue_capacity, 1000);
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: ReporterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.queue_capacity, 1000);
    }

    #[test]
    fn test_validate_rejects_zeroes() {
        let config = ReporterConfig {
            batch_size: 0,
            ..ReporterConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ReporterConfig {
            endpoint: String::new(),
            ..ReporterConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
