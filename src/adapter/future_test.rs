use crate::ChannelId;
use crate::RefHub;

#[tokio::test]
async fn when_ref_should_resolve_immediately_for_a_present_value() {
    let hub = RefHub::<String>::new();
    hub.set_ref("k", "v".to_string(), ChannelId::ANY);

    assert_eq!(hub.when_ref("k", ChannelId::ANY).await, "v".to_string());
}

#[tokio::test]
async fn when_ref_should_resolve_on_a_later_write() {
    let hub = RefHub::<String>::new();

    let waiting_hub = hub.clone();
    let handle =
        tokio::spawn(async move { waiting_hub.when_ref("k", ChannelId::ANY).await });
    // Let the adapter enroll before the write lands.
    tokio::task::yield_now().await;

    hub.set_ref("k", "late".to_string(), ChannelId::ANY);

    assert_eq!(handle.await.unwrap(), "late".to_string());
}

#[tokio::test]
async fn when_next_ref_should_ignore_the_current_value() {
    let hub = RefHub::<String>::new();
    hub.set_ref("k", "current".to_string(), ChannelId::ANY);

    let waiting_hub = hub.clone();
    let handle =
        tokio::spawn(async move { waiting_hub.when_next_ref("k", ChannelId::ANY).await });
    tokio::task::yield_now().await;

    hub.set_ref("k", "next".to_string(), ChannelId::ANY);

    assert_eq!(handle.await.unwrap(), "next".to_string());
}

#[tokio::test]
async fn when_unset_ref_should_resolve_with_the_removed_value() {
    let hub = RefHub::<String>::new();
    hub.set_ref("k", "v".to_string(), ChannelId::ANY);

    let waiting_hub = hub.clone();
    let handle =
        tokio::spawn(async move { waiting_hub.when_unset_ref("k", ChannelId::ANY).await });
    tokio::task::yield_now().await;

    hub.unset_ref("k", ChannelId::ANY);

    assert_eq!(handle.await.unwrap(), "v".to_string());
}
