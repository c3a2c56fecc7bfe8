//! Scalar values and flat property maps.
//!
//! Event bodies are flat string-keyed maps whose values are restricted to
//! JSON scalars. Keeping the value type closed (no nested objects, arrays,
//! or nulls) guarantees every envelope serializes to a flat, analyzable
//! record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single property value: string, integer, float, or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

/// A flat string-keyed map of scalar values.
///
/// Uses a sorted map so serialized output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, Scalar>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, replacing any existing value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge `other` into `self`. Keys present in `other` win.
    pub fn merge(&mut self, other: Properties) {
        self.entries.extend(other.entries);
    }

    /// Consume `self` and merge `other` on top of it.
    pub fn merged(mut self, other: Properties) -> Properties {
        self.merge(other);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Scalar)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_serde_untagged() {
        assert_eq!(serde_json::to_string(&Scalar::from("x")).unwrap(), "\"x\"");
        assert_eq!(serde_json::to_string(&Scalar::from(42i64)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&Scalar::from(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&Scalar::from(true)).unwrap(), "true");
    }

    #[test]
    fn test_properties_set_get() {
        let mut props = Properties::new();
        props.set("url", "https://example.com/");
        props.set("duration", 250i64);

        assert_eq!(props.len(), 2);
        assert_eq!(props.get("url"), Some(&Scalar::from("https://example.com/")));
        assert_eq!(props.get("duration"), Some(&Scalar::Int(250)));
        assert!(props.get("missing").is_none());
    }

    #[test]
    fn test_merge_right_side_wins() {
        let base = Properties::new()
            .with("url", "https://example.com/a")
            .with("language", "en-US");
        let payload = Properties::new()
            .with("url", "https://example.com/override")
            .with("duration", 100i64);

        let merged = base.merged(payload);
        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged.get("url"),
            Some(&Scalar::from("https://example.com/override"))
        );
        assert_eq!(merged.get("language"), Some(&Scalar::from("en-US")));
    }

    #[test]
    fn test_properties_serialize_flat() {
        let props = Properties::new().with("a", 1i64).with("b", "two");
        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(json, "{\"a\":1,\"b\":\"two\"}");
    }

    #[test]
    fn test_properties_roundtrip() {
        let props = Properties::new()
            .with("clicked", true)
            .with("dpr", 2.0)
            .with("page_x", 120i64);
        let json = serde_json::to_string(&props).unwrap();
        let back: Properties = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("clicked"), Some(&Scalar::Bool(true)));
        assert_eq!(back.get("page_x"), Some(&Scalar::Int(120)));
    }
}
