use std::sync::Arc;

use parking_lot::Mutex;

use crate::ChannelId;
use crate::RefHub;
use crate::RefProxy;
use crate::RegistryError;

#[test]
fn set_get_and_contains_should_reflect_the_backing_hub() {
    let hub = RefHub::<String>::new();
    let proxy = RefProxy::new(hub.clone(), ChannelId::ANY);

    assert!(proxy.get("k").is_none());
    assert!(!proxy.contains("k"));

    assert_eq!(proxy.set("k", "v".to_string()), "v".to_string());
    assert_eq!(proxy.get("k"), Some("v".to_string()));
    assert!(proxy.contains("k"));

    // Writes through the proxy are ordinary hub writes.
    assert_eq!(hub.get_ref("k", ChannelId::ANY), Some("v".to_string()));
}

#[test]
fn remove_should_fail_for_an_absent_key() {
    let hub = RefHub::<String>::new();
    let proxy = RefProxy::new(hub, ChannelId::ANY);

    proxy.set("k", "v".to_string());
    assert_eq!(proxy.remove("k").unwrap(), "v".to_string());

    match proxy.remove("k") {
        Err(RegistryError::KeyNotFound(key)) => assert_eq!(key, "k"),
        other => panic!("expected KeyNotFound, got {other:?}"),
    }
}

#[test]
fn proxy_should_respect_its_channel() {
    let hub = RefHub::<String>::new();
    let scoped = RefProxy::new(hub.clone(), hub.create_channel("scoped"));

    scoped.set("k", "scoped value".to_string());

    assert!(hub.get_ref("k", ChannelId::ANY).is_none());
    assert_eq!(scoped.get("k"), Some("scoped value".to_string()));
}

#[test]
fn seeded_proxy_should_fire_waiters_enrolled_before_construction() {
    let hub = RefHub::<String>::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    hub.get_next_ref(
        "seed",
        Arc::new(move |value: &String, _param, _key| sink.lock().push(value.clone())),
        ChannelId::ANY,
        None,
    );

    let proxy = RefProxy::seeded(
        hub,
        ChannelId::ANY,
        vec![("seed".to_string(), "initial".to_string())],
    );

    assert_eq!(*seen.lock(), vec!["initial".to_string()]);
    assert_eq!(proxy.get("seed"), Some("initial".to_string()));
}
