//! Preference persistence
//!
//! Features:
//! - Flat key-value model (ints, floats, strings)
//! - In-memory store for tests and headless runs
//! - JSON file store with atomic replace on flush
//!
//! Gameplay never fails on storage: callers log and carry on.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single stored preference value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl StoredValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StoredValue::Int(v) => Some(*v),
            StoredValue::Float(v) => Some(*v as i64),
            StoredValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            StoredValue::Int(v) => Some(*v as f32),
            StoredValue::Float(v) => Some(*v as f32),
            StoredValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            StoredValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat key-value preference store
pub trait KeyValueStore {
    /// Read a raw value
    fn get(&self, key: &str) -> Option<StoredValue>;

    /// Write a raw value (buffered until `flush`)
    fn set(&mut self, key: &str, value: StoredValue);

    /// Make buffered writes durable
    fn flush(&mut self) -> Result<(), StoreError>;

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(|v| v.as_int()).unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.set(key, StoredValue::Int(value));
    }

    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get(key).and_then(|v| v.as_float()).unwrap_or(default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.set(key, StoredValue::Float(value as f64));
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_text())
            .unwrap_or_else(|| default.to_string())
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.set(key, StoredValue::Text(value.to_string()));
    }

    /// Flush, logging instead of failing
    fn save(&mut self) {
        if let Err(err) = self.flush() {
            log::warn!("Preference save failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        assert_eq!(StoredValue::Int(7).as_float(), Some(7.0));
        assert_eq!(StoredValue::Float(2.9).as_int(), Some(2));
        assert_eq!(StoredValue::Text(" 42 ".into()).as_int(), Some(42));
        assert_eq!(StoredValue::Int(3).as_text(), None);
    }

    #[test]
    fn test_untagged_json_shape() {
        let json = r#"{ "a": 5, "b": 0.5, "c": "hi" }"#;
        let map: std::collections::BTreeMap<String, StoredValue> =
            serde_json::from_str(json).unwrap();
        assert_eq!(map["a"], StoredValue::Int(5));
        assert_eq!(map["b"], StoredValue::Float(0.5));
        assert_eq!(map["c"], StoredValue::Text("hi".into()));
    }

    #[test]
    fn test_store_error_wraps_source() {
        use std::error::Error as _;
        let err: StoreError = serde_json::from_str::<StoredValue>("{").unwrap_err().into();
        assert!(matches!(err, StoreError::Json(_)));
        assert!(err.to_string().starts_with("malformed JSON: "));
        assert!(err.source().is_some());

        let err = StoreError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "storage I/O failed: gone");
    }

    #[test]
    fn test_typed_defaults_on_missing_keys() {
        let store = MemoryStore::new();
        assert_eq!(store.get_int("HighScore", 0), 0);
        assert_eq!(store.get_float("SFXVolume", 1.0), 1.0);
        assert_eq!(store.get_string("LastNickname", ""), "");
    }
}
