//! Property-style facade over a hub channel.

use crate::ChannelId;
use crate::RefHub;
use crate::RegistryError;
use crate::Result;

/// Get / set / contains / remove over a fixed (hub, channel), mirroring
/// plain field access on an object.
///
/// Unlike the hub itself, [`RefProxy::remove`] reports failure when the key
/// is not currently present.
pub struct RefProxy<V> {
    hub: RefHub<V>,
    channel: ChannelId,
}

impl<V> Clone for RefProxy<V> {
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
            channel: self.channel,
        }
    }
}

impl<V> RefProxy<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(hub: RefHub<V>, channel: ChannelId) -> Self {
        Self { hub, channel }
    }

    /// Builds a proxy and writes the seed pairs through the hub, firing any
    /// waiters already enrolled for those keys.
    pub fn seeded(
        hub: RefHub<V>,
        channel: ChannelId,
        seed: impl IntoIterator<Item = (String, V)>,
    ) -> Self {
        let proxy = Self::new(hub, channel);
        for (key, value) in seed {
            proxy.hub.set_ref(&key, value, channel);
        }
        proxy
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.hub.get_ref(key, self.channel)
    }

    pub fn set(&self, key: &str, value: V) -> V {
        self.hub.set_ref(key, value, self.channel)
    }

    /// Whether the key currently holds a live value.
    pub fn contains(&self, key: &str) -> bool {
        self.hub.get_ref(key, self.channel).is_some()
    }

    /// Removes the key and returns its value, failing when it is not
    /// present.
    pub fn remove(&self, key: &str) -> Result<V> {
        self.hub
            .unset_ref(key, self.channel)
            .ok_or_else(|| RegistryError::KeyNotFound(key.to_owned()))
    }
}
