//! Error handling and edge case tests.

use retainer::{
    Callback, DeferredScheduler, Router, RouterConfig, RouterError, SubscribeOptions,
    SubscriptionKey,
};
use std::sync::Arc;

fn test_router() -> Router<u32> {
    Router::with_scheduler(RouterConfig::default(), Arc::new(DeferredScheduler::new())).unwrap()
}

fn noop() -> Callback<u32> {
    Callback::new(|_, _| {})
}

// --- Subscribe Errors ---

#[test]
fn test_subscribe_without_keys() {
    let router = test_router();

    let empty: Vec<&str> = Vec::new();
    let result = router.subscribe(empty, noop());
    assert!(matches!(result, Err(RouterError::InvalidArgument(_))));
    assert_eq!(router.subscription_count(), 0);
}

#[test]
fn test_subscribe_without_callback() {
    let router = test_router();

    let result = router.subscribe_with(SubscribeOptions {
        keys: vec!["k".into()],
        ..Default::default()
    });
    assert!(matches!(result, Err(RouterError::InvalidArgument(_))));
    assert_eq!(router.subscription_count(), 0);
}

#[test]
fn test_invalid_regex_rejected_before_subscribe() {
    let err = SubscriptionKey::pattern("[unterminated").unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("[unterminated"));
}

#[test]
fn test_topic_without_trailing_wildcard_rejected() {
    let router = test_router();

    let result = router.subscribe(SubscriptionKey::topic("a/b"), noop());
    assert!(matches!(result, Err(RouterError::InvalidArgument(_))));

    // Wildcard token not preceded by the separator
    let result = router.subscribe(SubscriptionKey::topic("ab*"), noop());
    assert!(matches!(result, Err(RouterError::InvalidArgument(_))));

    // One bad key rejects the whole call
    let result = router.subscribe(
        vec![SubscriptionKey::from("ok"), SubscriptionKey::topic("a/b")],
        noop(),
    );
    assert!(matches!(result, Err(RouterError::InvalidArgument(_))));
    assert_eq!(router.subscription_count(), 0);

    let handles = router.subscribe(SubscriptionKey::topic("a/b/*"), noop()).unwrap();
    assert_eq!(handles.len(), 1);
    assert_eq!(router.stats().pattern_subscriptions, 1);
}

#[test]
fn test_topic_checked_against_configured_separator() {
    let config = RouterConfig {
        topic_separator: ".".into(),
        ..Default::default()
    };
    let router = Router::<u32>::with_scheduler(config, Arc::new(DeferredScheduler::new())).unwrap();

    let result = router.subscribe(SubscriptionKey::topic("a/*"), noop());
    assert!(matches!(result, Err(RouterError::InvalidArgument(_))));
    assert!(router.subscribe(SubscriptionKey::topic("a.*"), noop()).is_ok());
}

#[test]
fn test_subscribe_with_once_option() {
    let router = test_router();
    let handles = router
        .subscribe_with(SubscribeOptions::new(["a", "b"], noop()).once(true))
        .unwrap();

    assert_eq!(handles.len(), 2);
    assert_eq!(handles[0].key(), &SubscriptionKey::from("a"));
    assert!(handles[0].id() < handles[1].id());
}

// --- Unsubscribe Edge Cases ---

#[test]
fn test_unsubscribe_nonexistent_pair() {
    let router = test_router();

    assert_eq!(router.unsubscribe_key("missing", &noop()), 0);
    assert_eq!(router.unsubscribe_key(SubscriptionKey::pattern("x").unwrap(), &noop()), 0);
    assert_eq!(router.unsubscribe(&[]).unwrap(), 0);
}

#[test]
fn test_unsubscribe_requires_same_callback() {
    let router = test_router();
    router.subscribe("k", noop()).unwrap();

    // A different closure with identical behaviour is a different callback
    assert_eq!(router.unsubscribe_key("k", &noop()), 0);
    assert_eq!(router.subscription_count(), 1);
}

#[test]
fn test_foreign_handle_is_invalid_argument() {
    let owner = test_router();
    let stranger = test_router();
    let handles = owner.subscribe("k", noop()).unwrap();

    let result = stranger.unsubscribe(&handles);
    assert!(matches!(result, Err(RouterError::InvalidArgument(_))));
    assert_eq!(owner.subscription_count(), 1);
}

#[test]
fn test_clear_when_already_empty() {
    let router = test_router();

    router.remove_all();
    router.remove_all();
    assert_eq!(router.unsubscribe_all(), 0);
    assert_eq!(router.unsubscribe_key("all", &noop()), 0);
}

// --- Message Store Edge Cases ---

#[test]
fn test_fetch_and_remove_unknown_key() {
    let router = test_router();

    assert_eq!(router.fetch("nope"), None);
    assert!(!router.remove("nope"));
}

#[test]
fn test_store_without_subscribers() {
    let router = test_router();
    router.store("lonely", 1);
    router.store_ephemeral("ghost", 2);

    assert_eq!(router.fetch("lonely"), Some(1));
    assert_eq!(router.fetch("ghost"), None);
    assert_eq!(router.stats().stored_messages, 1);
}

// --- Configuration Errors ---

#[test]
fn test_invalid_config_rejected() {
    let config = RouterConfig {
        topic_separator: String::new(),
        ..Default::default()
    };
    let result = Router::<u32>::with_config(config);
    assert!(matches!(result, Err(RouterError::InvalidConfig(_))));

    let config = RouterConfig {
        wildcard: String::new(),
        ..Default::default()
    };
    let result = Router::<u32>::with_scheduler(config, Arc::new(DeferredScheduler::new()));
    assert!(matches!(result, Err(RouterError::InvalidConfig(_))));
}

#[test]
fn test_config_from_json() {
    let config = RouterConfig::from_json(r##"{"topic_separator": "::", "wildcard": "#"}"##).unwrap();
    let router = Router::<u32>::with_scheduler(config, Arc::new(DeferredScheduler::new())).unwrap();

    assert_eq!(router.config().topic_separator, "::");
    let handles = router.subscribe("a::#", noop()).unwrap();
    assert!(matches!(handles[0].key(), SubscriptionKey::WildcardTopic(_)));
}
