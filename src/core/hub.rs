//! The registry engine.
//!
//! A write drains every waiter queued for its (channel, key) with the new
//! value, then commits the value into the channel store. A read either
//! completes synchronously or enrolls a callback for the next matching
//! write. A removal deletes the value and drains the removal waiters with
//! the captured value. No operation blocks and no callback runs while a map
//! guard is held, so callbacks may re-enter the hub freely.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use super::ChannelId;
use super::ChannelTable;
use super::JoinGetter;
use super::ObserverRecord;
use super::RefGetter;
use super::RefObserver;
use super::RefParam;
use super::Signature;
use super::WaitTable;
use super::Waiter;
use crate::HubConfig;

/// In-process reference hub: keyed values with retrieval-before-availability.
///
/// A `RefHub` is a cheap handle over shared state; clones observe the same
/// store. Drains run to completion inside the triggering `set_ref` /
/// `unset_ref`; registration never blocks the caller.
pub struct RefHub<V> {
    inner: Arc<HubInner<V>>,
}

impl<V> Clone for RefHub<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct HubInner<V> {
    config: HubConfig,
    channels: ChannelTable,
    /// Per-channel value store, created lazily on first access.
    stores: DashMap<ChannelId, HashMap<String, V>>,
    /// Entries awaiting the next write of their key.
    waiting: WaitTable<V>,
    /// Entries awaiting the next removal of their key.
    removal_waiting: WaitTable<V>,
    /// Observer records, cached per (channel, key).
    observers: DashMap<Signature, Arc<ObserverRecord<V>>>,
}

/// Partially resolved conjunctive read.
struct JoinState<V> {
    slots: Vec<Option<V>>,
    outstanding: usize,
    getter: JoinGetter<V>,
    param: Option<RefParam>,
}

impl<V> Default for RefHub<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RefHub<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a hub with default configuration.
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                channels: ChannelTable::new(),
                stores: DashMap::new(),
                waiting: WaitTable::new(),
                removal_waiting: WaitTable::new(),
                observers: DashMap::new(),
            }),
        }
    }

    /// Allocates an id for a named channel, or returns the existing id when
    /// the name was seen before.
    pub fn create_channel(&self, name: impl Into<String>) -> ChannelId {
        self.inner.channels.create(name)
    }

    /// Current value under (channel, key), if any.
    pub fn get_ref(&self, key: &str, channel: ChannelId) -> Option<V> {
        self.current(channel, key)
    }

    /// Read with delivery callback.
    ///
    /// If the value is present the getter fires synchronously and the value
    /// is returned. Otherwise the (getter, param) pair is appended to the
    /// waiting list and fires exactly once on the next write to this
    /// (channel, key), regardless of writes to other keys in between.
    pub fn get_ref_with(
        &self,
        key: &str,
        getter: RefGetter<V>,
        channel: ChannelId,
        param: Option<RefParam>,
    ) -> Option<V> {
        if let Some(value) = self.current(channel, key) {
            getter(&value, param.as_ref(), key);
            return Some(value);
        }
        self.enroll_getter(channel, key, getter, param);
        None
    }

    /// Conjunctive read: an AND-join over `keys`.
    ///
    /// Keys already present count toward completion immediately; each missing
    /// key enrolls its own single-key waiter closed over its index. The
    /// getter fires once, after every element has resolved, with values
    /// aligned to the order of `keys`. Returns the resolved values when
    /// everything was already present (the getter fires synchronously),
    /// `None` when the join completes asynchronously.
    pub fn get_refs(
        &self,
        keys: &[&str],
        getter: JoinGetter<V>,
        channel: ChannelId,
        param: Option<RefParam>,
    ) -> Option<Vec<V>> {
        let mut slots: Vec<Option<V>> = Vec::with_capacity(keys.len());
        let mut missing: Vec<usize> = Vec::new();
        for (index, key) in keys.iter().enumerate() {
            let current = self.current(channel, key);
            if current.is_none() {
                missing.push(index);
            }
            slots.push(current);
        }

        if missing.is_empty() {
            let values: Vec<V> = slots.into_iter().flatten().collect();
            getter(&values, param.as_ref());
            return Some(values);
        }

        let join = Arc::new(Mutex::new(JoinState {
            slots,
            outstanding: missing.len(),
            getter,
            param,
        }));

        for index in missing {
            let join = Arc::clone(&join);
            let joiner: RefGetter<V> = Arc::new(move |value, _param, _key| {
                // Fire outside the join lock so the caller's getter may
                // re-enter the hub.
                let completed = {
                    let mut state = join.lock();
                    if state.slots[index].is_none() {
                        state.slots[index] = Some(value.clone());
                        state.outstanding -= 1;
                    }
                    if state.outstanding == 0 {
                        let values: Vec<V> =
                            state.slots.iter().cloned().flatten().collect();
                        Some((values, Arc::clone(&state.getter), state.param.clone()))
                    } else {
                        None
                    }
                };
                if let Some((values, getter, param)) = completed {
                    getter(&values, param.as_ref());
                }
            });
            self.enroll_getter(channel, keys[index], joiner, None);
        }

        None
    }

    /// Next-value read: ignores any current value, the getter fires only on
    /// a write issued after this call, never synchronously.
    pub fn get_next_ref(
        &self,
        key: &str,
        getter: RefGetter<V>,
        channel: ChannelId,
        param: Option<RefParam>,
    ) {
        self.enroll_getter(channel, key, getter, param);
    }

    /// On-removal read: the getter fires once, with the removed value, on
    /// the next removal of (channel, key).
    pub fn get_remove_ref(
        &self,
        key: &str,
        getter: RefGetter<V>,
        channel: ChannelId,
        param: Option<RefParam>,
    ) {
        self.inner
            .removal_waiting
            .enroll(channel, key, Waiter::Getter { getter, param });
    }

    /// Write: fires every queued waiter with the new value in registration
    /// order, then commits the value into the channel store.
    ///
    /// A waiter never misses the write it waited for and never fires twice
    /// for a single `set_ref`; entries enrolled by re-entrant callbacks
    /// during the drain wait for the next write.
    pub fn set_ref(&self, key: &str, value: V, channel: ChannelId) -> V {
        debug!(key, %channel, "set_ref");
        let drained = self.inner.waiting.take(channel, key);
        for waiter in drained {
            match waiter {
                Waiter::Getter { getter, param } => getter(&value, param.as_ref(), key),
                Waiter::Observer(record) => record.on_signal(self, &value),
            }
        }
        self.store(channel, key, value.clone());
        value
    }

    /// Write with a time-boxed lifetime: a deferred removal of this
    /// (channel, key) runs after `ttl`. Requires a tokio runtime.
    ///
    /// The timer is best-effort and never retracted: an overwrite, or a
    /// removal followed by a re-create, does not stop it, and at expiry it
    /// removes whatever occupies the key at that point.
    pub fn set_ref_with_ttl(
        &self,
        key: &str,
        value: V,
        channel: ChannelId,
        ttl: Duration,
    ) -> V {
        let hub = self.clone();
        let expiring = key.to_owned();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            debug!(key = expiring.as_str(), %channel, "ttl expired");
            hub.unset_ref(&expiring, channel);
        });
        self.set_ref(key, value, channel)
    }

    /// Removal: deletes the value and drains the removal waiters with the
    /// captured value, each fired exactly once in registration order.
    /// Returns `None` with no side effect when the key is absent.
    pub fn unset_ref(&self, key: &str, channel: ChannelId) -> Option<V> {
        let removed = self
            .inner
            .stores
            .get_mut(&channel)
            .and_then(|mut store| store.remove(key))?;
        debug!(key, %channel, "unset_ref");
        for waiter in self.inner.removal_waiting.take(channel, key) {
            // Observer records only ever wait on writes.
            if let Waiter::Getter { getter, param } = waiter {
                getter(&removed, param.as_ref(), key);
            }
        }
        Some(removed)
    }

    /// Removes every key currently present in the channel through the
    /// ordinary removal path, firing removal waiters per key.
    pub fn unset_all(&self, channel: ChannelId) {
        let keys: Vec<String> = self
            .inner
            .stores
            .get(&channel)
            .map(|store| store.keys().cloned().collect())
            .unwrap_or_default();
        for key in keys {
            self.unset_ref(&key, channel);
        }
    }

    /// Durable observer for (channel, key); repeated calls return a handle
    /// to the same cached record.
    pub fn observe_ref(&self, key: &str, channel: ChannelId) -> RefObserver<V> {
        let record = self
            .inner
            .observers
            .entry((channel, key.to_owned()))
            .or_insert_with(|| Arc::new(ObserverRecord::new(channel, key.to_owned())))
            .clone();
        RefObserver::new(self.clone(), record)
    }

    pub(crate) fn enroll_observer(&self, record: Arc<ObserverRecord<V>>) {
        self.inner
            .waiting
            .enroll(record.channel(), record.key(), Waiter::Observer(record.clone()));
    }

    pub(crate) fn withdraw_observer(&self, record: &Arc<ObserverRecord<V>>) {
        self.inner
            .waiting
            .withdraw(record.channel(), record.key(), record);
    }

    fn enroll_getter(
        &self,
        channel: ChannelId,
        key: &str,
        getter: RefGetter<V>,
        param: Option<RefParam>,
    ) {
        let pending = self
            .inner
            .waiting
            .enroll(channel, key, Waiter::Getter { getter, param });
        if pending >= self.inner.config.pending_warn_threshold {
            warn!(key, %channel, pending, "waiting list grows without a matching write");
        }
    }

    fn store(&self, channel: ChannelId, key: &str, value: V) {
        let capacity = self.inner.config.channel_capacity_hint;
        self.inner
            .stores
            .entry(channel)
            .or_insert_with(|| HashMap::with_capacity(capacity))
            .insert(key.to_owned(), value);
    }

    fn current(&self, channel: ChannelId, key: &str) -> Option<V> {
        self.inner
            .stores
            .get(&channel)
            .and_then(|store| store.get(key).cloned())
    }
}
