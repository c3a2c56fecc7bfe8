//! Visitor and session identifier newtypes.
//!
//! Both wrap plain strings so any storage backend can round-trip them, but
//! keeping them as distinct types prevents the two from being swapped at a
//! call site.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident) => {
        /// See module docs.
        #[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_type!(AnonymousId);
id_type!(SessionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_debug() {
        let id = AnonymousId::new("abc123");
        assert_eq!(format!("{}", id), "abc123");
        assert_eq!(format!("{:?}", id), "AnonymousId(abc123)");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = SessionId::new("deadbeef");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_from_conversions() {
        let id: AnonymousId = "x".into();
        let raw: String = id.clone().into();
        assert_eq!(raw, "x");
        assert_eq!(id.as_str(), "x");
    }

    #[test]
    fn test_default_is_empty() {
        assert!(AnonymousId::default().is_empty());
        assert!(SessionId::default().is_empty());
    }
}
