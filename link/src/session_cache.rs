//! Per-session hand-off store.
//!
//! A producer page writes a dataset it already fetched; a later consumer
//! reads it instead of fetching again. Values are kept as serialized JSON
//! text so neither side depends on the other's in-memory types. There is no
//! expiry: entries live as long as the cache and are invalidated by callers.

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::error::Result;

/// Cloning shares the same entries.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    entries: Arc<DashMap<String, String>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a JSON value under `dataset`, replacing any previous entry
    pub fn put(&self, dataset: &str, value: &JsonValue) {
        self.put_raw(dataset, value.to_string());
    }

    /// Read `dataset` back. Missing or unparseable entries are absent.
    pub fn get(&self, dataset: &str) -> Option<JsonValue> {
        let text = self.get_raw(dataset)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("[SESSION_CACHE] Ignoring malformed entry '{}': {}", dataset, e);
                None
            },
        }
    }

    /// Serialize and store any value
    pub fn put_json<T: Serialize + ?Sized>(&self, dataset: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.put_raw(dataset, text);
        Ok(())
    }

    /// Read and deserialize; a shape mismatch is treated as a miss
    pub fn get_json<T: DeserializeOwned>(&self, dataset: &str) -> Option<T> {
        let text = self.get_raw(dataset)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("[SESSION_CACHE] Entry '{}' does not match requested type: {}", dataset, e);
                None
            },
        }
    }

    /// Store pre-serialized text as-is
    pub fn put_raw(&self, dataset: &str, text: impl Into<String>) {
        log::debug!("[SESSION_CACHE] put '{}'", dataset);
        self.entries.insert(dataset.to_string(), text.into());
    }

    pub fn get_raw(&self, dataset: &str) -> Option<String> {
        let hit = self.entries.get(dataset).map(|entry| entry.value().clone());
        log::debug!(
            "[SESSION_CACHE] get '{}': {}",
            dataset,
            if hit.is_some() { "hit" } else { "miss" }
        );
        hit
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.entries.contains_key(dataset)
    }

    /// Invalidate one dataset; returns whether it was present
    pub fn remove(&self, dataset: &str) -> bool {
        self.entries.remove(dataset).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
