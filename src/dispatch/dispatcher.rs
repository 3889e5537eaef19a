//! Hands matched entries to the scheduler and retires once-subscribers.

use crate::subscriptions::{Entry, Registry};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use super::scheduler::Scheduler;

/// Schedules one task per matched entry.
pub struct Dispatcher<V> {
    scheduler: Arc<dyn Scheduler>,
    /// Weak so queued deliveries never keep a dropped router's registry alive.
    registry: Weak<RwLock<Registry<V>>>,
}

impl<V: Send + Sync + 'static> Dispatcher<V> {
    pub fn new(scheduler: Arc<dyn Scheduler>, registry: &Arc<RwLock<Registry<V>>>) -> Self {
        Self {
            scheduler,
            registry: Arc::downgrade(registry),
        }
    }

    /// Schedule `entries` in order. Nothing is invoked before this returns.
    ///
    /// `entries` is an owned snapshot, so registry changes made after this
    /// call do not affect what is delivered.
    pub fn deliver(&self, entries: Vec<Arc<Entry<V>>>, key: &str, value: Arc<V>) {
        if entries.is_empty() {
            return;
        }

        let key: Arc<str> = Arc::from(key);
        for entry in entries {
            trace!(key = %key, subscription = %entry.id, "scheduling delivery");

            let key = Arc::clone(&key);
            let value = Arc::clone(&value);
            let registry = self.registry.clone();

            self.scheduler.schedule(Box::new(move || {
                entry.callback.call(&key, &value);

                // Retire by the entry's own identity, not the delivered key.
                if entry.once {
                    if let Some(registry) = registry.upgrade() {
                        if registry.write().remove(entry.id, &entry.key) {
                            debug!(subscription = %entry.id, key = %entry.key, "once subscription retired");
                        }
                    }
                }
            }));
        }
    }

    pub fn flush(&self) {
        self.scheduler.flush();
    }
}
