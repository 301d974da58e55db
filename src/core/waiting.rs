//! Waiting registry primitives.
//!
//! Both the next-write and the on-removal registries are [`WaitTable`]s: one
//! FIFO queue of pending entries per (channel, key). Draining a queue
//! detaches it whole before any callback runs, so entries enrolled by
//! re-entrant calls land in a fresh queue and are never visited in the same
//! pass.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;

use super::ChannelId;
use super::ObserverRecord;

/// Opaque auxiliary parameter stored alongside a callback and handed back
/// verbatim when it fires.
pub type RefParam = Arc<dyn Any + Send + Sync>;

/// Callback fired with the delivered value, the auxiliary parameter given at
/// registration and the key it was registered under.
pub type RefGetter<V> = Arc<dyn Fn(&V, Option<&RefParam>, &str) + Send + Sync>;

/// Callback for conjunctive reads, fired once with the index-aligned values.
pub type JoinGetter<V> = Arc<dyn Fn(&[V], Option<&RefParam>) + Send + Sync>;

/// Waiting lists are keyed by (channel, key).
pub(crate) type Signature = (ChannelId, String);

/// A queued entry awaiting the next write (or removal) of its key.
pub(crate) enum Waiter<V> {
    /// One-shot getter, discarded after firing.
    Getter {
        getter: RefGetter<V>,
        param: Option<RefParam>,
    },
    /// Observer record; re-enrolls itself when fired.
    Observer(Arc<ObserverRecord<V>>),
}

/// FIFO waiting lists keyed by (channel, key).
pub(crate) struct WaitTable<V> {
    queues: DashMap<Signature, VecDeque<Waiter<V>>>,
}

impl<V> WaitTable<V> {
    pub(crate) fn new() -> Self {
        Self {
            queues: DashMap::new(),
        }
    }

    /// Appends an entry, returning the queue length after insertion.
    pub(crate) fn enroll(&self, channel: ChannelId, key: &str, waiter: Waiter<V>) -> usize {
        let mut queue = self.queues.entry((channel, key.to_owned())).or_default();
        queue.push_back(waiter);
        queue.len()
    }

    /// Detaches and returns the whole queue for (channel, key), leaving the
    /// slot empty. Callers fire the entries after the map guard is released.
    pub(crate) fn take(&self, channel: ChannelId, key: &str) -> VecDeque<Waiter<V>> {
        self.queues
            .remove(&(channel, key.to_owned()))
            .map(|(_, queue)| queue)
            .unwrap_or_default()
    }

    /// Removes every queued occurrence of `record`, duplicates from a raced
    /// re-enrollment included. Plain getter entries are untouched.
    pub(crate) fn withdraw(&self, channel: ChannelId, key: &str, record: &Arc<ObserverRecord<V>>) {
        if let Some(mut queue) = self.queues.get_mut(&(channel, key.to_owned())) {
            queue.retain(|waiter| match waiter {
                Waiter::Observer(queued) => !Arc::ptr_eq(queued, record),
                Waiter::Getter { .. } => true,
            });
        }
    }
}
