use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use dashmap::DashMap;

/// Isolation domain for keys.
///
/// The same key string may hold unrelated values under different channels.
/// Operations against one channel never observe another channel's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

impl ChannelId {
    /// Default channel targeted by every operation unless told otherwise.
    pub const ANY: ChannelId = ChannelId(0);
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Idempotent name -> id allocation for named channels.
///
/// Requesting the same name twice returns the same id. Allocated ids start
/// above [`ChannelId::ANY`], which is never handed out by name.
#[derive(Debug)]
pub(crate) struct ChannelTable {
    names: DashMap<String, ChannelId>,
    next_id: AtomicU32,
}

impl ChannelTable {
    pub(crate) fn new() -> Self {
        Self {
            names: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    pub(crate) fn create(&self, name: impl Into<String>) -> ChannelId {
        *self
            .names
            .entry(name.into())
            .or_insert_with(|| ChannelId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }
}
