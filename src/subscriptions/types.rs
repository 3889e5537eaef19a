//! Subscription types.

use crate::matcher;
use crate::types::{Callback, IntoKeys, SubscriptionId, SubscriptionKey};
use std::fmt;

/// Options for a subscribe call.
///
/// `callback` is optional so a request assembled from loose parts can be
/// rejected with an invalid-argument error instead of panicking.
pub struct SubscribeOptions<V> {
    /// Keys to register, in order. Must not be empty.
    pub keys: Vec<SubscriptionKey>,

    /// Callback invoked on every matching store.
    pub callback: Option<Callback<V>>,

    /// Remove the registration after its first delivery.
    /// Default: false
    pub once: bool,
}

impl<V> SubscribeOptions<V> {
    pub fn new(keys: impl IntoKeys, callback: Callback<V>) -> Self {
        Self {
            keys: keys.into_keys(),
            callback: Some(callback),
            once: false,
        }
    }

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }
}

impl<V> Default for SubscribeOptions<V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            callback: None,
            once: false,
        }
    }
}

impl<V> fmt::Debug for SubscribeOptions<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeOptions")
            .field("keys", &self.keys)
            .field("callback", &self.callback)
            .field("once", &self.once)
            .finish()
    }
}

/// A registered subscriber.
pub struct Entry<V> {
    pub id: SubscriptionId,
    pub key: SubscriptionKey,
    pub callback: Callback<V>,
    pub once: bool,
    /// Leading segments for wildcard topic keys; empty otherwise.
    pub(crate) prefix: Vec<String>,
}

impl<V> Entry<V> {
    /// Check a pattern or topic entry against a stored key.
    ///
    /// Exact entries are found through their bucket and never scanned.
    pub(crate) fn matches(&self, key: &str, separator: &str) -> bool {
        match &self.key {
            SubscriptionKey::Exact(_) => false,
            SubscriptionKey::Pattern(regex) => matcher::regex_matches(regex, key),
            SubscriptionKey::WildcardTopic(_) => matcher::topic_matches(&self.prefix, key, separator),
        }
    }
}

impl<V> fmt::Debug for Entry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("once", &self.once)
            .finish()
    }
}
