use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Counters bumped on the transport's hot paths.
///
/// Each counter sits on its own cache line so concurrent senders on
/// different connections do not contend on one line.
#[derive(Default)]
pub struct LoopStats {
    xmit_messages: CachePadded<AtomicU64>,
    xmit_bytes: CachePadded<AtomicU64>,
    cong_updates: CachePadded<AtomicU64>,
    conn_allocs: CachePadded<AtomicU64>,
    conn_frees: CachePadded<AtomicU64>,
    exit_destroyed: CachePadded<AtomicU64>,
    passive_at_exit: CachePadded<AtomicU64>,
}

/// Point-in-time copy of [`LoopStats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub xmit_messages: u64,
    pub xmit_bytes: u64,
    pub cong_updates: u64,
    pub conn_allocs: u64,
    pub conn_frees: u64,
    pub exit_destroyed: u64,
    /// Passive connections found in the registry at exit. Should stay zero.
    pub passive_at_exit: u64,
}

impl LoopStats {
    pub(crate) fn record_xmit(&self, bytes: usize) {
        self.xmit_messages.fetch_add(1, Relaxed);
        self.xmit_bytes.fetch_add(bytes as u64, Relaxed);
    }

    pub(crate) fn record_cong_update(&self) {
        self.cong_updates.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_alloc(&self) {
        self.conn_allocs.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_free(&self) {
        self.conn_frees.fetch_add(1, Relaxed);
    }

    pub(crate) fn record_exit_destroy(&self, passive: bool) {
        self.exit_destroyed.fetch_add(1, Relaxed);
        if passive {
            self.passive_at_exit.fetch_add(1, Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            xmit_messages: self.xmit_messages.load(Relaxed),
            xmit_bytes: self.xmit_bytes.load(Relaxed),
            cong_updates: self.cong_updates.load(Relaxed),
            conn_allocs: self.conn_allocs.load(Relaxed),
            conn_frees: self.conn_frees.load(Relaxed),
            exit_destroyed: self.exit_destroyed.load(Relaxed),
            passive_at_exit: self.passive_at_exit.load(Relaxed),
        }
    }
}
