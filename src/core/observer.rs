//! Durable subscriptions layered on the one-shot waiting mechanism.
//!
//! An [`ObserverRecord`] sits in the waiting registry as a self-reinserting
//! entry: each write re-enrolls it before listeners run, turning the
//! one-shot waiter protocol into a standing subscription that survives every
//! update until stopped.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracing::warn;

use super::ChannelId;
use super::RefGetter;
use super::RefHub;
use super::RefParam;

/// Dispatch target of an observer listener.
#[derive(Clone)]
pub enum ListenerTarget<V> {
    /// Invoke a callback with each signaled value.
    Callback(RefGetter<V>),
    /// Republish each signaled value under another key in the same channel,
    /// so waiters and observers of that key receive it. A target equal to
    /// the observed key is skipped: forwarding to itself would recurse on
    /// every write.
    Forward(String),
}

impl<V> ListenerTarget<V> {
    /// Convenience constructor for callback targets.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&V, Option<&RefParam>, &str) + Send + Sync + 'static,
    {
        ListenerTarget::Callback(Arc::new(f))
    }
}

struct ListenerEntry<V> {
    id: u64,
    target: ListenerTarget<V>,
    param: Option<RefParam>,
}

/// Shared per-(channel, key) observer state.
pub struct ObserverRecord<V> {
    channel: ChannelId,
    key: String,
    running: AtomicBool,
    listeners: Mutex<Vec<ListenerEntry<V>>>,
    next_listener_id: AtomicU64,
}

impl<V> ObserverRecord<V> {
    pub(crate) fn new(channel: ChannelId, key: String) -> Self {
        Self {
            channel,
            key,
            running: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn channel(&self) -> ChannelId {
        self.channel
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}

impl<V> ObserverRecord<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Fired by a write's drain. Re-enrolls for the next write before
    /// anything else, bails if the observer was stopped since enrollment,
    /// then notifies a snapshot of the listener list.
    pub(crate) fn on_signal(self: Arc<Self>, hub: &RefHub<V>, value: &V) {
        hub.enroll_observer(Arc::clone(&self));
        if !self.running.load(Ordering::Acquire) {
            // A stop landed while this entry was detached in the drain and
            // could not withdraw it; undo the re-enrollment here.
            hub.withdraw_observer(&self);
            return;
        }

        // Snapshot first: listeners may add or remove listeners re-entrantly.
        let snapshot: Vec<(ListenerTarget<V>, Option<RefParam>)> = self
            .listeners
            .lock()
            .iter()
            .map(|entry| (entry.target.clone(), entry.param.clone()))
            .collect();

        for (target, param) in snapshot {
            match target {
                ListenerTarget::Callback(getter) => getter(value, param.as_ref(), &self.key),
                ListenerTarget::Forward(forward_key) => {
                    if forward_key == self.key {
                        warn!(key = self.key.as_str(), "forward listener targets its own key, skipped");
                        continue;
                    }
                    hub.set_ref(&forward_key, value.clone(), self.channel);
                }
            }
        }
    }
}

/// Control handle for an observed (channel, key).
///
/// Obtained from [`RefHub::observe_ref`]; handles for the same pair share
/// one cached record, so listeners attached through one handle fire for a
/// subscription started through another.
pub struct RefObserver<V> {
    hub: RefHub<V>,
    record: Arc<ObserverRecord<V>>,
}

impl<V> Clone for RefObserver<V> {
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
            record: Arc::clone(&self.record),
        }
    }
}

impl<V> RefObserver<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(hub: RefHub<V>, record: Arc<ObserverRecord<V>>) -> Self {
        Self { hub, record }
    }

    /// Current stored value for the observed (channel, key), independent of
    /// running state.
    pub fn value(&self) -> Option<V> {
        self.hub.get_ref(self.record.key(), self.record.channel())
    }

    /// Starts the subscription; no-op while already running.
    ///
    /// With `replay` an existing value is pushed through the signal path
    /// immediately (the signal performs the enrollment itself); without it
    /// the first signal is the next write, and any pre-existing value stays
    /// readable through [`RefObserver::value`].
    pub fn start(&self, replay: bool) {
        if self.record.running.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(key = self.record.key(), channel = %self.record.channel(), "observer started");
        // Drop any occurrence a stop that raced a drain left behind, so a
        // restart subscribes exactly once.
        self.hub.withdraw_observer(&self.record);
        if replay {
            if let Some(value) = self.value() {
                Arc::clone(&self.record).on_signal(&self.hub, &value);
                return;
            }
        }
        self.hub.enroll_observer(Arc::clone(&self.record));
    }

    /// Stops the subscription and withdraws every queued occurrence of the
    /// record, duplicates from a raced re-enrollment included; idempotent.
    pub fn stop(&self) {
        self.record.running.store(false, Ordering::Release);
        self.hub.withdraw_observer(&self.record);
    }

    /// Re-writes the current value unchanged, forcing waiters and running
    /// observers to fire again with it; no-op when no value exists. Used to
    /// replay state to late-attached listeners.
    pub fn flush(&self) {
        if let Some(value) = self.value() {
            self.hub
                .set_ref(self.record.key(), value, self.record.channel());
        }
    }

    /// Attaches a listener; the returned guard removes exactly this
    /// listener.
    pub fn add_listener(
        &self,
        target: ListenerTarget<V>,
        param: Option<RefParam>,
    ) -> ListenerGuard<V> {
        let id = self
            .record
            .next_listener_id
            .fetch_add(1, Ordering::Relaxed);
        self.record
            .listeners
            .lock()
            .push(ListenerEntry { id, target, param });
        ListenerGuard {
            record: Arc::clone(&self.record),
            id,
        }
    }
}

/// Removes the listener it was issued for; idempotent and safe to invoke
/// any number of times.
pub struct ListenerGuard<V> {
    record: Arc<ObserverRecord<V>>,
    id: u64,
}

impl<V> ListenerGuard<V> {
    pub fn remove(&self) {
        self.record
            .listeners
            .lock()
            .retain(|entry| entry.id != self.id);
    }
}
