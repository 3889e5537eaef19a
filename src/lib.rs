//! # Retainer
//!
//! An in-process publish/subscribe router that keeps the last value stored
//! under each key.
//!
//! ## Core Concepts
//!
//! - **Store**: persists a value under a key and notifies matching subscribers
//! - **Subscriptions**: exact keys, regular expressions, and wildcard topics
//! - **Wildcard publish**: storing `"a/*"` reaches every exact subscriber under `a/`
//! - **Delivery**: always asynchronous, in subscription order, exact before pattern
//!
//! ## Example
//!
//! ```ignore
//! use retainer::{Callback, Router, SubscriptionKey};
//! use serde_json::json;
//!
//! let router: Router = Router::new()?;
//!
//! // Exact and regex subscriptions
//! router.subscribe("user/42", Callback::new(|key, value| println!("{key}: {value}")))?;
//! router.subscribe_once(SubscriptionKey::pattern("^user/")?, Callback::new(|key, _| {
//!     println!("first user update on {key}");
//! }))?;
//!
//! // Persist and notify
//! router.store("user/42", json!({"name": "Ada"}));
//! assert_eq!(router.fetch("user/42"), Some(json!({"name": "Ada"})));
//!
//! // Notify every exact subscriber under user/ without persisting
//! router.store_ephemeral("user/*", json!("refresh"));
//! ```

pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod messages;
pub mod router;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use dispatch::{DeferredScheduler, Dispatcher, Scheduler, Task, ThreadScheduler};
pub use error::{Result, RouterError};
pub use messages::MessageStore;
pub use router::{Router, RouterConfig, RouterStats, UNSUBSCRIBE_ALL};
pub use subscriptions::{Entry, Registry, SubscribeOptions};
pub use types::*;
