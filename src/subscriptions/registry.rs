//! Subscription registry: exact-key buckets plus an ordered pattern list.

use crate::matcher;
use crate::types::{Callback, SubscriptionId, SubscriptionKey};
use std::collections::HashMap;
use std::sync::Arc;

use super::types::Entry;

/// Owns every subscriber entry.
///
/// Exact keys live in per-key buckets kept in subscription order. Regex and
/// wildcard-topic subscriptions live in a single ordered list that is scanned
/// on every store.
pub struct Registry<V> {
    /// Topic separator, e.g. `/`.
    separator: String,
    /// Wildcard token, e.g. `*`.
    wildcard: String,
    /// Exact-key buckets.
    exact: HashMap<String, Vec<Arc<Entry<V>>>>,
    /// Regex and wildcard-topic entries in subscription order.
    patterns: Vec<Arc<Entry<V>>>,
    /// Counter for generating subscription IDs.
    next_id: u64,
}

impl<V> Registry<V> {
    pub fn new(separator: impl Into<String>, wildcard: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            wildcard: wildcard.into(),
            exact: HashMap::new(),
            patterns: Vec::new(),
            next_id: 1,
        }
    }

    /// True if a stored key fans out as a wildcard publish.
    pub fn is_wildcard(&self, key: &str) -> bool {
        matcher::is_wildcard(key, &self.separator, &self.wildcard)
    }

    /// Turn an exact key carrying the wildcard into a topic key.
    pub fn classify(&self, key: SubscriptionKey) -> SubscriptionKey {
        match key {
            SubscriptionKey::Exact(k) if self.is_wildcard(&k) => SubscriptionKey::WildcardTopic(k),
            other => other,
        }
    }

    /// Register one (key, callback) pair. Returns the new entry.
    pub fn add(&mut self, key: SubscriptionKey, callback: Callback<V>, once: bool) -> Arc<Entry<V>> {
        let key = self.classify(key);
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let prefix = match &key {
            SubscriptionKey::WildcardTopic(topic) => matcher::topic_prefix(topic, &self.separator),
            _ => Vec::new(),
        };

        let entry = Arc::new(Entry {
            id,
            key,
            callback,
            once,
            prefix,
        });

        match &entry.key {
            SubscriptionKey::Exact(k) => {
                self.exact
                    .entry(k.clone())
                    .or_default()
                    .push(Arc::clone(&entry));
            }
            _ => self.patterns.push(Arc::clone(&entry)),
        }

        entry
    }

    /// Remove exactly one registration. Returns false if it is already gone.
    pub fn remove(&mut self, id: SubscriptionId, key: &SubscriptionKey) -> bool {
        match key {
            SubscriptionKey::Exact(k) => {
                let Some(bucket) = self.exact.get_mut(k) else {
                    return false;
                };
                let Some(pos) = bucket.iter().position(|e| e.id == id) else {
                    return false;
                };
                bucket.remove(pos);
                if bucket.is_empty() {
                    self.exact.remove(k);
                }
                true
            }
            _ => match self.patterns.iter().position(|e| e.id == id) {
                Some(pos) => {
                    self.patterns.remove(pos);
                    true
                }
                None => false,
            },
        }
    }

    /// Remove every registration of `callback` under `key`.
    ///
    /// Patterns compare by source text, topics and exact keys by string.
    pub fn remove_matching(&mut self, key: &SubscriptionKey, callback: &Callback<V>) -> usize {
        let key = self.classify(key.clone());
        match &key {
            SubscriptionKey::Exact(k) => {
                let Some(bucket) = self.exact.get_mut(k) else {
                    return 0;
                };
                let before = bucket.len();
                bucket.retain(|e| !e.callback.ptr_eq(callback));
                let removed = before - bucket.len();
                if bucket.is_empty() {
                    self.exact.remove(k);
                }
                removed
            }
            _ => {
                let before = self.patterns.len();
                self.patterns
                    .retain(|e| !(e.key == key && e.callback.ptr_eq(callback)));
                before - self.patterns.len()
            }
        }
    }

    /// Drop every subscription. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.len();
        self.exact.clear();
        self.patterns.clear();
        removed
    }

    /// Entries for a stored key: the exact bucket, then matching patterns,
    /// each group in subscription order.
    pub fn matches_for(&self, key: &str) -> Vec<Arc<Entry<V>>> {
        let mut matched: Vec<Arc<Entry<V>>> = self.exact.get(key).cloned().unwrap_or_default();

        matched.extend(
            self.patterns
                .iter()
                .filter(|e| e.matches(key, &self.separator))
                .cloned(),
        );

        matched
    }

    /// Entries reached by a wildcard publish such as `"a/*"`.
    ///
    /// Scans every exact bucket; pattern entries are not consulted. The
    /// result is in subscription order across buckets.
    pub fn matches_for_topic(&self, topic: &str) -> Vec<Arc<Entry<V>>> {
        let prefix = matcher::topic_prefix(topic, &self.separator);

        let mut matched: Vec<Arc<Entry<V>>> = self
            .exact
            .iter()
            .filter(|(k, _)| matcher::topic_matches(&prefix, k, &self.separator))
            .flat_map(|(_, bucket)| bucket.iter().cloned())
            .collect();

        matched.sort_by_key(|e| e.id);
        matched
    }

    /// Number of exact-key registrations.
    pub fn exact_count(&self) -> usize {
        self.exact.values().map(Vec::len).sum()
    }

    /// Number of regex and wildcard-topic registrations.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn len(&self) -> usize {
        self.exact_count() + self.pattern_count()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty()
    }
}
