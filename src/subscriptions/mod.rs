//! Subscription registry.
//!
//! Subscribers register on one of three kinds of key:
//! - exact keys, found through a per-key bucket
//! - regular expressions, scanned on every store
//! - wildcard topics (`"a/b/*"`), scanned on every store
//!
//! A store call reaches the exact bucket first and the pattern list second,
//! each in subscription order.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = Registry::new("/", "*");
//! registry.add("sensors/temp".into(), callback.clone(), false);
//! registry.add(SubscriptionKey::pattern("^sensors/")?, callback, true);
//!
//! let entries = registry.matches_for("sensors/temp");
//! assert_eq!(entries.len(), 2);
//! ```

mod registry;
mod types;

pub use registry::Registry;
pub use types::{Entry, SubscribeOptions};
