//! One-shot future adapters over the callback protocol.
//!
//! Each adapter resolves exactly once with the delivered value and never
//! fails: if the underlying waiter is orphaned the future stays pending,
//! mirroring a promise that never settles.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::ChannelId;
use crate::RefGetter;
use crate::RefHub;

impl<V> RefHub<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Resolves with the value under (channel, key): immediately when
    /// present, on the next write otherwise.
    pub async fn when_ref(&self, key: &str, channel: ChannelId) -> V {
        let (getter, rx) = one_shot_getter::<V>();
        self.get_ref_with(key, getter, channel, None);
        resolve(rx).await
    }

    /// Resolves with the next value written to (channel, key), ignoring any
    /// current value.
    pub async fn when_next_ref(&self, key: &str, channel: ChannelId) -> V {
        let (getter, rx) = one_shot_getter::<V>();
        self.get_next_ref(key, getter, channel, None);
        resolve(rx).await
    }

    /// Resolves with the value captured by the next removal of
    /// (channel, key).
    pub async fn when_unset_ref(&self, key: &str, channel: ChannelId) -> V {
        let (getter, rx) = one_shot_getter::<V>();
        self.get_remove_ref(key, getter, channel, None);
        resolve(rx).await
    }
}

fn one_shot_getter<V>() -> (RefGetter<V>, oneshot::Receiver<V>)
where
    V: Clone + Send + Sync + 'static,
{
    let (tx, rx) = oneshot::channel();
    let tx = Mutex::new(Some(tx));
    let getter: RefGetter<V> = Arc::new(move |value: &V, _param, _key| {
        if let Some(tx) = tx.lock().take() {
            let _ = tx.send(value.clone());
        }
    });
    (getter, rx)
}

async fn resolve<V>(rx: oneshot::Receiver<V>) -> V {
    match rx.await {
        Ok(value) => value,
        // Sender dropped without firing: stay pending forever.
        Err(_) => std::future::pending().await,
    }
}
