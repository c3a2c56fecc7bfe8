//! The envelope is the unit of transmission: a routing head plus a flat
//! property body.
//!
//! The head carries the event code, library identification, the construction
//! timestamp, and the visitor/session identifiers. The body is the ambient
//! page context merged with the caller-supplied payload; payload keys win on
//! collision. Envelopes are immutable once constructed: the timestamp is
//! fixed at creation, not at transmission.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ids::{AnonymousId, SessionId};
use crate::scalar::Properties;

/// Library tag carried in every envelope head.
pub const LIB_TAG: &str = "rust";

/// Library version carried in every envelope head.
pub const LIB_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeHead {
    /// Event type identifier, e.g. `$page_view`.
    pub code: String,
    /// Library tag.
    pub lib: String,
    /// Library version.
    pub lib_version: String,
    /// Construction time, epoch milliseconds.
    pub time: i64,
    /// Long-lived visitor identifier.
    pub aaid: AnonymousId,
    /// Short-lived session identifier.
    pub sid: SessionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub head: EnvelopeHead,
    pub body: Properties,
}

impl Envelope {
    /// Build an envelope for `code`, stamping the current time.
    ///
    /// `context` is the ambient page context; `payload` is the caller's data
    /// and wins on key collision.
    pub fn new(
        code: impl Into<String>,
        aaid: AnonymousId,
        sid: SessionId,
        context: Properties,
        payload: Properties,
    ) -> Self {
        Self {
            head: EnvelopeHead {
                code: code.into(),
                lib: LIB_TAG.to_string(),
                lib_version: LIB_VERSION.to_string(),
                time: Utc::now().timestamp_millis(),
                aaid,
                sid,
            },
            body: context.merged(payload),
        }
    }

    pub fn code(&self) -> &str {
        &self.head.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::Scalar;

    fn ids() -> (AnonymousId, SessionId) {
        (AnonymousId::new("a".repeat(32)), SessionId::new("s".repeat(32)))
    }

    #[test]
    fn test_envelope_head_fields() {
        let (aaid, sid) = ids();
        let before = Utc::now().timestamp_millis();
        let env = Envelope::new("$page_view", aaid.clone(), sid.clone(), Properties::new(), Properties::new());
        let after = Utc::now().timestamp_millis();

        assert_eq!(env.code(), "$page_view");
        assert_eq!(env.head.lib, "rust");
        assert!(!env.head.lib_version.is_empty());
        assert!(env.head.time >= before && env.head.time <= after);
        assert_eq!(env.head.aaid, aaid);
        assert_eq!(env.head.sid, sid);
    }

    #[test]
    fn test_payload_wins_over_context() {
        let (aaid, sid) = ids();
        let context = Properties::new()
            .with("url", "https://example.com/ambient")
            .with("title", "Ambient");
        let payload = Properties::new().with("url", "https://example.com/explicit");

        let env = Envelope::new("$page_leave", aaid, sid, context, payload);
        assert_eq!(
            env.body.get("url"),
            Some(&Scalar::from("https://example.com/explicit"))
        );
        assert_eq!(env.body.get("title"), Some(&Scalar::from("Ambient")));
    }

    #[test]
    fn test_envelope_serializes_as_head_body() {
        let (aaid, sid) = ids();
        let env = Envelope::new(
            "$page_load",
            aaid,
            sid,
            Properties::new(),
            Properties::new().with("x", 1i64),
        );
        let value: serde_json::Value = serde_json::to_value(&env).unwrap();

        assert!(value.get("head").is_some());
        assert!(value.get("body").is_some());
        assert_eq!(value["head"]["code"], "$page_load");
        assert_eq!(value["body"]["x"], 1);
        // Head and body are the whole projection.
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_envelope_roundtrip() {
        let (aaid, sid) = ids();
        let env = Envelope::new(
            "$scroll",
            aaid,
            sid,
            Properties::new().with("view_position", 900i64),
            Properties::new(),
        );
        let json = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
    }
}
