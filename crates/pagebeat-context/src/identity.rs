//! Visitor identity: a long-lived anonymous id and a rotating session id.
//!
//! The anonymous id persists for years and identifies the browser install.
//! The session id expires after an inactivity window; every access extends
//! it, so rotation happens only when the visitor has been away long enough.
//!
//! Persistence goes through the `IdentityStore` capability so hosts can back
//! it with whatever storage they own. Storage failures never surface to the
//! tracking path; the manager falls back to a fresh id and logs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use pagebeat_types::{AnonymousId, SessionId};

/// Length of generated identifiers, in hex characters.
const ID_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The backing store rejected a read or write.
    #[error("identity store error: {0}")]
    Store(String),
}

/// Capability trait for identifier persistence with per-entry expiry.
pub trait IdentityStore: Send + Sync {
    /// Read a live (non-expired) value.
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError>;

    /// Write a value that expires `ttl` from now.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), IdentityError>;

    /// Drop a value.
    fn remove(&self, key: &str) -> Result<(), IdentityError>;
}

/// In-memory store with expiry, for tests and hosts without persistence.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, expires)) if *expires > Utc::now() => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), IdentityError> {
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), Utc::now() + ttl));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), IdentityError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Identity lifetimes and storage keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Anonymous id lifetime in days.
    #[serde(default = "default_anonymous_ttl_days")]
    pub anonymous_ttl_days: u32,

    /// Session inactivity window in minutes.
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: u32,

    /// Storage key for the anonymous id.
    #[serde(default = "default_anonymous_key")]
    pub anonymous_key: String,

    /// Storage key for the session id.
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

fn default_anonymous_ttl_days() -> u32 {
    365 * 2
}

fn default_session_ttl_minutes() -> u32 {
    30
}

fn default_anonymous_key() -> String {
    "pb_anonymous_id".to_string()
}

fn default_session_key() -> String {
    "pb_session_id".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            anonymous_ttl_days: default_anonymous_ttl_days(),
            session_ttl_minutes: default_session_ttl_minutes(),
            anonymous_key: default_anonymous_key(),
            session_key: default_session_key(),
        }
    }
}

impl IdentityConfig {
    fn anonymous_ttl(&self) -> Duration {
        Duration::days(self.anonymous_ttl_days as i64)
    }

    fn session_ttl(&self) -> Duration {
        Duration::minutes(self.session_ttl_minutes as i64)
    }
}

/// Capability trait consumed by the reporter when stamping envelope heads.
pub trait IdentityProvider: Send + Sync {
    fn anonymous_id(&self) -> AnonymousId;
    fn session_id(&self) -> SessionId;
}

/// Get-or-create identity management over a pluggable store.
pub struct IdentityManager {
    store: Arc<dyn IdentityStore>,
    config: IdentityConfig,
}

impl IdentityManager {
    pub fn new(store: Arc<dyn IdentityStore>, config: IdentityConfig) -> Self {
        Self { store, config }
    }

    /// Manager backed by an in-memory store with default lifetimes.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), IdentityConfig::default())
    }

    /// Rotate the session id immediately, returning the new id.
    pub fn reset_session(&self) -> SessionId {
        let id = random_hex_id();
        self.persist(&self.config.session_key, &id, self.config.session_ttl());
        SessionId::new(id)
    }

    /// Forget both identifiers.
    pub fn clear_all(&self) {
        for key in [&self.config.anonymous_key, &self.config.session_key] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key = %key, error = %e, "failed to clear identity");
            }
        }
    }

    fn get_or_create(&self, key: &str, ttl: Duration, touch: bool) -> String {
        match self.store.get(key) {
            Ok(Some(existing)) => {
                if touch {
                    self.persist(key, &existing, ttl);
                }
                existing
            }
            Ok(None) => {
                let id = random_hex_id();
                self.persist(key, &id, ttl);
                id
            }
            Err(e) => {
                // Degrade to an ephemeral id rather than failing the caller.
                tracing::warn!(key = %key, error = %e, "identity store read failed");
                random_hex_id()
            }
        }
    }

    fn persist(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.store.set(key, value, ttl) {
            tracing::warn!(key = %key, error = %e, "identity store write failed");
        }
    }
}

impl IdentityProvider for IdentityManager {
    fn anonymous_id(&self) -> AnonymousId {
        AnonymousId::new(self.get_or_create(
            &self.config.anonymous_key,
            self.config.anonymous_ttl(),
            false,
        ))
    }

    fn session_id(&self) -> SessionId {
        // Touching on every access means the session only rotates after a
        // full inactivity window.
        SessionId::new(self.get_or_create(
            &self.config.session_key,
            self.config.session_ttl(),
            true,
        ))
    }
}

/// A fixed identity, for tests and hosts that manage ids themselves.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    pub aaid: AnonymousId,
    pub sid: SessionId,
}

impl StaticIdentity {
    pub fn new(aaid: impl Into<AnonymousId>, sid: impl Into<SessionId>) -> Self {
        Self {
            aaid: aaid.into(),
            sid: sid.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn anonymous_id(&self) -> AnonymousId {
        self.aaid.clone()
    }

    fn session_id(&self) -> SessionId {
        self.sid.clone()
    }
}

fn random_hex_id() -> String {
    const CHARS: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_hex_id_shape() {
        let id = random_hex_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn test_anonymous_id_stable() {
        let manager = IdentityManager::in_memory();
        let first = manager.anonymous_id();
        let second = manager.anonymous_id();
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 32);
    }

    #[test]
    fn test_session_id_stable_while_active() {
        let manager = IdentityManager::in_memory();
        let first = manager.session_id();
        let second = manager.session_id();
        assert_eq!(first, second);
    }

    #[test]
    fn test_session_rotates_after_expiry() {
        let store = Arc::new(MemoryStore::new());
        let config = IdentityConfig {
            session_ttl_minutes: 0,
            ..IdentityConfig::default()
        };
        let manager = IdentityManager::new(store, config);

        // Zero-minute window: every access sees an expired entry.
        let first = manager.session_id();
        let second = manager.session_id();
        assert_ne!(first, second);
    }

    #[test]
    fn test_reset_session_changes_id() {
        let manager = IdentityManager::in_memory();
        let before = manager.session_id();
        let rotated = manager.reset_session();
        assert_ne!(before, rotated);
        assert_eq!(manager.session_id(), rotated);
    }

    #[test]
    fn test_clear_all_regenerates() {
        let manager = IdentityManager::in_memory();
        let before = manager.anonymous_id();
        manager.clear_all();
        let after = manager.anonymous_id();
        assert_ne!(before, after);
    }

    #[test]
    fn test_memory_store_expiry() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::minutes(-1)).unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v", Duration::minutes(5)).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_static_identity() {
        let identity = StaticIdentity::new("aaaa", "ssss");
        assert_eq!(identity.anonymous_id().as_str(), "aaaa");
        assert_eq!(identity.session_id().as_str(), "ssss");
    }

    #[test]
    fn test_identity_config_defaults() {
        let config = IdentityConfig::default();
        assert_eq!(config.anonymous_ttl_days, 730);
        assert_eq!(config.session_ttl_minutes, 30);
        assert_eq!(config.anonymous_key, "pb_anonymous_id");
        assert_eq!(config.session_key, "pb_session_id");
    }
}
