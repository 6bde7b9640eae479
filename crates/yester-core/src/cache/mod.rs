//! Local (per-device) content cache.
//!
//! An in-memory map from [`CacheKey`] to a generated result set, persisted as a
//! single JSON object through a [`KeyValueStore`]. Entries never expire and
//! there is no size bound.

mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use std::collections::HashMap;

use crate::error::Result;
use crate::types::{CacheKey, HistoricalEvent};

/// In-memory content cache keyed by `year-region-topic`.
#[derive(Debug, Default, Clone)]
pub struct ContentCache {
    entries: HashMap<CacheKey, Vec<HistoricalEvent>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Vec<HistoricalEvent>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a result set. Empty sets are never cached.
    pub fn set(&mut self, key: CacheKey, events: Vec<HistoricalEvent>) -> bool {
        if events.is_empty() {
            return false;
        }
        self.entries.insert(key, events);
        true
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<Vec<HistoricalEvent>> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached keys in sorted order
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Serialize the whole cache as a JSON object
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Merge a persisted snapshot into this cache.
    ///
    /// Entries already present in memory win over persisted ones, so a
    /// late-loading snapshot never clobbers fresher results.
    pub fn deserialize(&mut self, raw: &str) -> Result<usize> {
        let persisted: HashMap<CacheKey, Vec<HistoricalEvent>> = serde_json::from_str(raw)?;
        let mut merged = 0;
        for (key, events) in persisted {
            if events.is_empty() || self.entries.contains_key(&key) {
                continue;
            }
            self.entries.insert(key, events);
            merged += 1;
        }
        Ok(merged)
    }
}
