//! Session memory — a key/value map of structured values.
//!
//! Each conversation owns one store. Values are arbitrary JSON, keys are
//! unique, and the last write wins. Nothing is evicted or persisted.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// In-memory key/value store owned by a single conversation.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite `key`, returning the full current mapping.
    pub fn store(&mut self, key: impl Into<String>, value: Value) -> &HashMap<String, Value> {
        let key = key.into();
        debug!(key = %key, "Storing memory entry");
        self.entries.insert(key, value);
        &self.entries
    }

    /// The value under `key`, or an empty object when absent.
    pub fn get(&self, key: &str) -> Value {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
