//! pagebeat: client-side behavioral telemetry.
//!
//! A host environment feeds page signals (load, show, visibility, history
//! mutation, click, scroll, unload) into a session state machine; the
//! resulting events join host-initiated `track` calls in a bounded queue
//! that a reporter drains into fixed-size batches for a fire-and-forget
//! transport.
//!
//! Everything is wired explicitly (environment, identity, transport) so
//! the pipeline carries no hidden global state. For hosts that want one
//! shared instance, a process-wide default lives behind [`init_global`] /
//! [`global`]; nothing inside the pipeline uses it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pagebeat::{Pagebeat, Properties, SimulatedPage};
//!
//! # async fn run() {
//! let page = Arc::new(SimulatedPage::new("https://example.com/"));
//! let beat = Pagebeat::builder(page.clone())
//!     .endpoint("https://collect.example.com/t")
//!     .build()
//!     .unwrap();
//! beat.start();
//!
//! beat.auto().handle_load();
//! beat.auto().handle_show();
//! beat.track("signup_click", Properties::new().with("plan", "pro"));
//!
//! beat.auto().handle_unload();
//! beat.destroy();
//! # }
//! ```

pub mod logging;

use std::sync::{Arc, OnceLock};

pub use pagebeat_context::{
    ContextCollector, IdentityConfig, IdentityManager, IdentityProvider, IdentityStore,
    MemoryStore, PageEnvironment, PageState, SimulatedPage, StaticIdentity,
};
pub use pagebeat_reporter::{
    BeaconTransport, ConfigError, FileTransport, LogTransport, RecordingTransport, Reporter,
    ReporterConfig, Transport,
};
pub use pagebeat_tracker::{AutoTracker, ClickTarget, PageTracker, TrackerConfig, UrlHistory};
pub use pagebeat_types::{
    codes, AnonymousId, Envelope, EnvelopeHead, Properties, Scalar, SessionId, TrackSink,
};

pub use logging::{init_logging, LogConfig};

/// One fully wired telemetry pipeline.
pub struct Pagebeat {
    reporter: Arc<Reporter>,
    auto: Arc<AutoTracker>,
}

impl Pagebeat {
    pub fn builder(env: Arc<dyn PageEnvironment>) -> PagebeatBuilder {
        PagebeatBuilder {
            env,
            identity: None,
            transport: None,
            reporter_config: ReporterConfig::default(),
            tracker_config: TrackerConfig::default(),
        }
    }

    /// Record a host-defined event.
    pub fn track(&self, code: &str, payload: Properties) {
        self.reporter.track(code, payload);
    }

    /// The signal adapter to feed browser-lifecycle notifications into.
    pub fn auto(&self) -> &Arc<AutoTracker> {
        &self.auto
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    /// Begin periodic flushing. Must be called from within a tokio runtime.
    pub fn start(&self) {
        self.reporter.start();
    }

    /// Flush queued events now.
    pub fn flush(&self) {
        self.reporter.consume();
    }

    /// Final flush and teardown. Idempotent.
    pub fn destroy(&self) {
        self.reporter.destroy();
    }
}

pub struct PagebeatBuilder {
    env: Arc<dyn PageEnvironment>,
    identity: Option<Arc<dyn IdentityProvider>>,
    transport: Option<Arc<dyn Transport>>,
    reporter_config: ReporterConfig,
    tracker_config: TrackerConfig,
}

impl PagebeatBuilder {
    /// Replace the default in-memory identity manager.
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Replace the default beacon transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn reporter_config(mut self, config: ReporterConfig) -> Self {
        self.reporter_config = config;
        self
    }

    pub fn tracker_config(mut self, config: TrackerConfig) -> Self {
        self.tracker_config = config;
        self
    }

    /// Shorthand for setting the delivery endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.reporter_config.endpoint = endpoint.into();
        self
    }

    /// Shorthand for toggling verbose batch diagnostics.
    pub fn debug(mut self, debug: bool) -> Self {
        self.reporter_config.debug = debug;
        self
    }

    /// Validate the configuration and wire the pipeline.
    ///
    /// When no transport was supplied, a [`BeaconTransport`] is created for
    /// the configured endpoint, which requires a tokio runtime.
    pub fn build(self) -> Result<Pagebeat, ConfigError> {
        self.reporter_config.validate()?;

        let identity = self
            .identity
            .unwrap_or_else(|| Arc::new(IdentityManager::in_memory()));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(BeaconTransport::new(self.reporter_config.endpoint.clone())));

        let reporter = Reporter::new(self.reporter_config, self.env.clone(), identity, transport);
        let auto = AutoTracker::new(
            self.tracker_config,
            self.env,
            reporter.clone() as Arc<dyn TrackSink>,
        );

        Ok(Pagebeat { reporter, auto })
    }
}

static GLOBAL: OnceLock<Pagebeat> = OnceLock::new();

/// Install the process-wide default instance. Fails if one is already set,
/// handing the rejected instance back.
pub fn init_global(pagebeat: Pagebeat) -> Result<(), Pagebeat> {
    GLOBAL.set(pagebeat)
}

/// The process-wide default instance, if installed.
pub fn global() -> Option<&'static Pagebeat> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> (Arc<SimulatedPage>, Arc<RecordingTransport>, Pagebeat) {
        let page = Arc::new(SimulatedPage::new("https://example.com/home"));
        let transport = Arc::new(RecordingTransport::new());
        let beat = Pagebeat::builder(page.clone())
            .transport(transport.clone())
            .identity(Arc::new(StaticIdentity::new("a".repeat(32), "s".repeat(32))))
            .build()
            .unwrap();
        (page, transport, beat)
    }

    #[test]
    fn test_full_session_through_pipeline() {
        let (page, transport, beat) = pipeline();

        beat.auto().handle_load();
        beat.auto().handle_show();
        beat.track("cta_click", Properties::new().with("variant", "b"));

        page.navigate("https://example.com/pricing");
        beat.auto().settle_url();

        beat.auto().handle_unload();
        beat.destroy();

        let codes: Vec<String> = transport
            .take_batches()
            .into_iter()
            .flatten()
            .map(|e| e.head.code)
            .collect();
        assert_eq!(
            codes,
            vec![
                "$page_load",
                "$page_view",
                "cta_click",
                "$page_leave",
                "$page_view",
                "$page_leave",
            ]
        );
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let page = Arc::new(SimulatedPage::new("https://example.com/"));
        let result = Pagebeat::builder(page)
            .reporter_config(ReporterConfig {
                batch_size: 0,
                ..ReporterConfig::default()
            })
            .transport(Arc::new(RecordingTransport::new()))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_flush_drains_queue() {
        let (_page, transport, beat) = pipeline();
        beat.track("one", Properties::new());
        beat.track("two", Properties::new());

        assert_eq!(beat.reporter().queue_len(), 2);
        beat.flush();
        assert_eq!(beat.reporter().queue_len(), 0);
        assert_eq!(transport.envelope_count(), 2);
    }

    #[tokio::test]
    async fn test_started_pipeline_flushes_periodically() {
        let page = Arc::new(SimulatedPage::new("https://example.com/"));
        let transport = Arc::new(RecordingTransport::new());
        let beat = Pagebeat::builder(page)
            .transport(transport.clone())
            .reporter_config(ReporterConfig {
                flush_interval_ms: 20,
                ..ReporterConfig::default()
            })
            .build()
            .unwrap();
        beat.start();

        beat.track("tick", Properties::new());
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(transport.envelope_count(), 1);
        beat.destroy();
    }
}
