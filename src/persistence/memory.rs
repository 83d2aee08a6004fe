//! In-memory preference store

use std::collections::BTreeMap;

use super::{KeyValueStore, StoreError, StoredValue};

/// Volatile store; `flush` always succeeds
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, StoredValue>,
    flushes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful flushes (useful to check persistence happened)
    pub fn flush_count(&self) -> u32 {
        self.flushes
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<StoredValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: StoredValue) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut store = MemoryStore::new();
        store.set_int("HighScore", 1200);
        store.set_string("LastNickname", "mira");
        store.set_float("BGMVolume", 0.25);

        assert_eq!(store.get_int("HighScore", 0), 1200);
        assert_eq!(store.get_string("LastNickname", ""), "mira");
        assert!((store.get_float("BGMVolume", 1.0) - 0.25).abs() < 1e-6);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_save_counts_flushes() {
        let mut store = MemoryStore::new();
        store.save();
        store.save();
        assert_eq!(store.flush_count(), 2);
    }
}
