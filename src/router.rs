//! Main Router struct tying all components together.

use crate::dispatch::{Dispatcher, Scheduler, ThreadScheduler};
use crate::error::{Result, RouterError};
use crate::messages::MessageStore;
use crate::subscriptions::{Registry, SubscribeOptions};
use crate::types::{Callback, IntoKeys, RouterId, SubscriptionHandle, SubscriptionKey};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Key that clears every subscription when passed to `unsubscribe_key`.
pub const UNSUBSCRIBE_ALL: &str = "all";

static NEXT_ROUTER_ID: AtomicU64 = AtomicU64::new(1);

/// Router configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Separator between topic segments.
    /// Default: "/"
    pub topic_separator: String,

    /// Token that marks a wildcard topic when it is the last segment.
    /// Default: "*"
    pub wildcard: String,

    /// Name of the dispatch worker thread.
    pub worker_thread_name: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            topic_separator: "/".to_string(),
            wildcard: "*".to_string(),
            worker_thread_name: "retainer-dispatch".to_string(),
        }
    }
}

impl RouterConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic_separator.is_empty() {
            return Err(RouterError::InvalidConfig("topic_separator is empty".into()));
        }
        if self.wildcard.is_empty() {
            return Err(RouterError::InvalidConfig("wildcard is empty".into()));
        }
        if self.wildcard.contains(&self.topic_separator) {
            return Err(RouterError::InvalidConfig(format!(
                "wildcard {:?} contains the topic separator {:?}",
                self.wildcard, self.topic_separator
            )));
        }
        Ok(())
    }
}

/// Snapshot of router sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterStats {
    pub exact_subscriptions: usize,
    pub pattern_subscriptions: usize,
    pub stored_messages: usize,
}

/// An in-process pub/sub router that retains the last value per key.
///
/// Provides a unified interface for:
/// - Subscribing callbacks to exact keys, regexes, and wildcard topics
/// - Storing values, which persists them and notifies matching subscribers
/// - Fetching and removing stored values
///
/// Notification is always asynchronous: `store` returns before any
/// subscriber runs.
pub struct Router<V = serde_json::Value> {
    id: RouterId,

    config: RouterConfig,

    /// Shared with the dispatcher so once-subscribers can retire themselves.
    registry: Arc<RwLock<Registry<V>>>,

    messages: MessageStore<V>,

    dispatcher: Dispatcher<V>,
}

impl<V: Clone + Send + Sync + 'static> Router<V> {
    /// Router with the default configuration and a worker-thread scheduler.
    pub fn new() -> Result<Self> {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Result<Self> {
        config.validate()?;
        let scheduler = Arc::new(ThreadScheduler::new(&config.worker_thread_name)?);
        Self::with_scheduler(config, scheduler)
    }

    /// Router that delivers through a caller-supplied scheduler.
    pub fn with_scheduler(config: RouterConfig, scheduler: Arc<dyn Scheduler>) -> Result<Self> {
        config.validate()?;

        let id = RouterId(NEXT_ROUTER_ID.fetch_add(1, Ordering::Relaxed));
        let registry = Arc::new(RwLock::new(Registry::new(
            config.topic_separator.clone(),
            config.wildcard.clone(),
        )));
        let dispatcher = Dispatcher::new(scheduler, &registry);

        debug!(router = ?id, separator = %config.topic_separator, "router created");

        Ok(Self {
            id,
            config,
            registry,
            messages: MessageStore::new(),
            dispatcher,
        })
    }

    pub fn id(&self) -> RouterId {
        self.id
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // --- Subscriptions ---

    /// Subscribe `callback` to one key or an ordered list of keys.
    ///
    /// Returns one handle per key.
    pub fn subscribe(&self, keys: impl IntoKeys, callback: Callback<V>) -> Result<Vec<SubscriptionHandle>> {
        self.subscribe_with(SubscribeOptions::new(keys, callback))
    }

    /// Like `subscribe`, but each registration is removed after its first delivery.
    pub fn subscribe_once(
        &self,
        keys: impl IntoKeys,
        callback: Callback<V>,
    ) -> Result<Vec<SubscriptionHandle>> {
        self.subscribe_with(SubscribeOptions::new(keys, callback).once(true))
    }

    pub fn subscribe_with(&self, options: SubscribeOptions<V>) -> Result<Vec<SubscriptionHandle>> {
        let SubscribeOptions { keys, callback, once } = options;

        if keys.is_empty() {
            return Err(RouterError::InvalidArgument("at least one key is required".into()));
        }
        let Some(callback) = callback else {
            return Err(RouterError::InvalidArgument("callback is required".into()));
        };

        let mut registry = self.registry.write();

        // Reject the whole call before registering anything.
        if let Some(SubscriptionKey::WildcardTopic(topic)) = keys.iter().find(|key| {
            matches!(key, SubscriptionKey::WildcardTopic(topic) if !registry.is_wildcard(topic))
        }) {
            return Err(RouterError::InvalidArgument(format!(
                "wildcard topic {:?} must end in {:?} followed by {:?}",
                topic, self.config.topic_separator, self.config.wildcard
            )));
        }

        let handles = keys
            .into_iter()
            .map(|key| {
                let entry = registry.add(key, callback.clone(), once);
                debug!(subscription = %entry.id, key = %entry.key, once, "subscribed");
                SubscriptionHandle {
                    router: self.id,
                    id: entry.id,
                    key: entry.key.clone(),
                }
            })
            .collect();

        Ok(handles)
    }

    /// Remove the registrations behind `handles`.
    ///
    /// Returns how many were still registered. Handles minted by another
    /// router are rejected before anything is removed.
    pub fn unsubscribe(&self, handles: &[SubscriptionHandle]) -> Result<usize> {
        if let Some(foreign) = handles.iter().find(|h| h.router != self.id) {
            return Err(RouterError::InvalidArgument(format!(
                "handle {} belongs to {:?}, not {:?}",
                foreign.id, foreign.router, self.id
            )));
        }

        let mut registry = self.registry.write();
        let removed = handles
            .iter()
            .filter(|h| registry.remove(h.id, &h.key))
            .count();

        debug!(requested = handles.len(), removed, "unsubscribed by handle");
        Ok(removed)
    }

    /// Remove every registration of `callback` under `key`.
    ///
    /// The exact key `"all"` clears every subscription regardless of callback.
    pub fn unsubscribe_key(&self, key: impl Into<SubscriptionKey>, callback: &Callback<V>) -> usize {
        let key = key.into();
        if key == SubscriptionKey::Exact(UNSUBSCRIBE_ALL.to_string()) {
            return self.unsubscribe_all();
        }

        let removed = self.registry.write().remove_matching(&key, callback);
        debug!(key = %key, removed, "unsubscribed by key");
        removed
    }

    /// Drop every subscription. Returns how many were removed.
    pub fn unsubscribe_all(&self) -> usize {
        let removed = self.registry.write().clear();
        debug!(removed, "all subscriptions cleared");
        removed
    }

    pub fn subscription_count(&self) -> usize {
        self.registry.read().len()
    }

    // --- Messages ---

    /// Persist `value` under `key` and notify matching subscribers.
    pub fn store(&self, key: &str, value: V) {
        self.store_with(key, value, false);
    }

    /// Notify matching subscribers without persisting `value`.
    pub fn store_ephemeral(&self, key: &str, value: V) {
        self.store_with(key, value, true);
    }

    /// Store with explicit control over persistence.
    ///
    /// A key ending in the wildcard segment (e.g. `"a/*"`) notifies every
    /// exact subscriber whose key shares the leading segments.
    pub fn store_with(&self, key: &str, value: V, skip_persist: bool) {
        if !skip_persist {
            self.messages.put(key, value.clone());
        }

        let entries = {
            let registry = self.registry.read();
            if registry.is_wildcard(key) {
                registry.matches_for_topic(key)
            } else {
                registry.matches_for(key)
            }
        };

        debug!(key, skip_persist, subscribers = entries.len(), "stored");
        self.dispatcher.deliver(entries, key, Arc::new(value));
    }

    /// Last value stored under `key`, if any.
    pub fn fetch(&self, key: &str) -> Option<V> {
        self.messages.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.messages.contains(key)
    }

    /// Delete the stored value. Returns whether one existed.
    pub fn remove(&self, key: &str) -> bool {
        self.messages.remove(key)
    }

    /// Delete every stored value. Subscriptions are untouched.
    pub fn remove_all(&self) {
        self.messages.clear();
    }

    /// Snapshot of stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.messages.keys()
    }

    // --- Misc ---

    pub fn stats(&self) -> RouterStats {
        let registry = self.registry.read();
        RouterStats {
            exact_subscriptions: registry.exact_count(),
            pattern_subscriptions: registry.pattern_count(),
            stored_messages: self.messages.len(),
        }
    }

    /// Block until every delivery scheduled so far has run.
    pub fn flush(&self) {
        self.dispatcher.flush();
    }
}
