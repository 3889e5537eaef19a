//! Last-value message storage.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Maps each key to the last value stored under it.
///
/// Entries are never evicted; they live until `remove` or `clear`.
pub struct MessageStore<V> {
    messages: RwLock<HashMap<String, V>>,
}

impl<V: Clone> MessageStore<V> {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
        }
    }

    /// Store a value, returning the one it replaced.
    pub fn put(&self, key: &str, value: V) -> Option<V> {
        self.messages.write().insert(key.to_string(), value)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.messages.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.read().contains_key(key)
    }

    /// Delete a value. Returns whether anything was stored.
    pub fn remove(&self, key: &str) -> bool {
        self.messages.write().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Snapshot of the stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.messages.read().keys().cloned().collect()
    }
}

impl<V: Clone> Default for MessageStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
