//! Core types for the router.

use crate::error::{Result, RouterError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Unique identifier for one registered (key, callback) pair.
///
/// Identifiers are handed out in increasing order, so comparing two of them
/// tells which subscription was made first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the router instance that minted a handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouterId(pub u64);

impl fmt::Debug for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouterId({})", self.0)
    }
}

/// What a subscription listens on.
#[derive(Clone)]
pub enum SubscriptionKey {
    /// Literal key, matched by string equality.
    Exact(String),
    /// Regular expression tested against the whole stored key.
    Pattern(Regex),
    /// Hierarchical topic ending in the wildcard token, e.g. `"a/b/*"`.
    WildcardTopic(String),
}

impl SubscriptionKey {
    /// Compile a regular-expression key.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(SubscriptionKey::Pattern)
            .map_err(|source| RouterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Wildcard topic key such as `"a/b/*"`.
    ///
    /// Subscribing fails unless the topic ends in the router's separator
    /// followed by its wildcard token.
    pub fn topic(topic: impl Into<String>) -> Self {
        SubscriptionKey::WildcardTopic(topic.into())
    }

    /// Source text of the key: the literal, the regex source, or the topic.
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionKey::Exact(key) => key,
            SubscriptionKey::Pattern(regex) => regex.as_str(),
            SubscriptionKey::WildcardTopic(topic) => topic,
        }
    }
}

impl PartialEq for SubscriptionKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SubscriptionKey::Exact(a), SubscriptionKey::Exact(b)) => a == b,
            (SubscriptionKey::Pattern(a), SubscriptionKey::Pattern(b)) => a.as_str() == b.as_str(),
            (SubscriptionKey::WildcardTopic(a), SubscriptionKey::WildcardTopic(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for SubscriptionKey {}

impl fmt::Debug for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionKey::Exact(key) => write!(f, "Exact({:?})", key),
            SubscriptionKey::Pattern(regex) => write!(f, "Pattern(/{}/)", regex.as_str()),
            SubscriptionKey::WildcardTopic(topic) => write!(f, "WildcardTopic({:?})", topic),
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionKey::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

impl From<&str> for SubscriptionKey {
    fn from(key: &str) -> Self {
        SubscriptionKey::Exact(key.to_string())
    }
}

impl From<String> for SubscriptionKey {
    fn from(key: String) -> Self {
        SubscriptionKey::Exact(key)
    }
}

impl From<&String> for SubscriptionKey {
    fn from(key: &String) -> Self {
        SubscriptionKey::Exact(key.clone())
    }
}

impl From<Regex> for SubscriptionKey {
    fn from(regex: Regex) -> Self {
        SubscriptionKey::Pattern(regex)
    }
}

/// One key or an ordered list of keys accepted by `subscribe`.
pub trait IntoKeys {
    fn into_keys(self) -> Vec<SubscriptionKey>;
}

impl IntoKeys for SubscriptionKey {
    fn into_keys(self) -> Vec<SubscriptionKey> {
        vec![self]
    }
}

impl IntoKeys for &str {
    fn into_keys(self) -> Vec<SubscriptionKey> {
        vec![self.into()]
    }
}

impl IntoKeys for String {
    fn into_keys(self) -> Vec<SubscriptionKey> {
        vec![self.into()]
    }
}

impl IntoKeys for Regex {
    fn into_keys(self) -> Vec<SubscriptionKey> {
        vec![self.into()]
    }
}

impl<T: Into<SubscriptionKey>> IntoKeys for Vec<T> {
    fn into_keys(self) -> Vec<SubscriptionKey> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<SubscriptionKey>, const N: usize> IntoKeys for [T; N] {
    fn into_keys(self) -> Vec<SubscriptionKey> {
        self.into_iter().map(Into::into).collect()
    }
}

impl IntoKeys for &[&str] {
    fn into_keys(self) -> Vec<SubscriptionKey> {
        self.iter().map(|key| SubscriptionKey::from(*key)).collect()
    }
}

/// Subscriber callback, invoked with the stored key and value.
///
/// Two callbacks are the same callback when they share the allocation, so a
/// clone can be used to unsubscribe the original.
pub struct Callback<V>(Arc<dyn Fn(&str, &V) + Send + Sync>);

impl<V> Callback<V> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &V) + Send + Sync + 'static,
    {
        Callback(Arc::new(f))
    }

    pub fn call(&self, key: &str, value: &V) {
        (self.0)(key, value)
    }

    pub fn ptr_eq(&self, other: &Callback<V>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<V> Clone for Callback<V> {
    fn clone(&self) -> Self {
        Callback(Arc::clone(&self.0))
    }
}

impl<V> fmt::Debug for Callback<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// Handle returned by `subscribe`, one per registered key.
///
/// Passing it back to `unsubscribe` removes exactly the registration that
/// produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionHandle {
    pub(crate) router: RouterId,
    pub(crate) id: SubscriptionId,
    pub(crate) key: SubscriptionKey,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }
}
