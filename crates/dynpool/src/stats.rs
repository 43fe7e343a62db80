//! Atomic usage counters for pools.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a pool's usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolUsage {
    /// Blocks freshly allocated from the system allocator.
    pub allocated: u64,
    /// Idle blocks currently on the free list.
    pub available: u64,
    /// Acquisitions served from the free list.
    pub reused: u64,
    /// Idle blocks whose memory was freed by teardown.
    pub reclaimed: u64,
}

impl PoolUsage {
    /// Blocks currently held by callers.
    ///
    /// Derived from event totals, so only meaningful for counters that have
    /// not been reset while blocks were outstanding.
    #[must_use]
    pub fn in_use(&self) -> u64 {
        self.allocated
            .saturating_sub(self.reclaimed)
            .saturating_sub(self.available)
    }
}

/// Lock-free counters behind [`PoolUsage`].
///
/// Counters are best effort: they are updated with relaxed ordering after
/// the free-list operation they describe, so a snapshot taken during
/// concurrent traffic may be momentarily inconsistent.
#[derive(Debug)]
pub struct AtomicPoolUsage {
    allocated: AtomicU64,
    available: AtomicU64,
    reused: AtomicU64,
    reclaimed: AtomicU64,
}

impl AtomicPoolUsage {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self {
            allocated: AtomicU64::new(0),
            available: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            reclaimed: AtomicU64::new(0),
        }
    }

    /// Take a snapshot of the current counters.
    pub fn snapshot(&self) -> PoolUsage {
        PoolUsage {
            allocated: self.allocated.load(Ordering::Relaxed),
            available: self.available.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
        }
    }

    /// Reset the event counters.
    ///
    /// `available` is a live count of idle blocks, not an event total, so it
    /// is left as is.
    pub fn reset(&self) {
        self.allocated.store(0, Ordering::Relaxed);
        self.reused.store(0, Ordering::Relaxed);
        self.reclaimed.store(0, Ordering::Relaxed);
    }

    /// A fresh block was allocated.
    pub fn record_alloc(&self) {
        self.allocated.fetch_add(1, Ordering::Relaxed);
    }

    /// A block was popped from the free list.
    pub fn record_reuse(&self) {
        self.reused.fetch_add(1, Ordering::Relaxed);
        self.available.fetch_sub(1, Ordering::Relaxed);
    }

    /// A block was pushed back onto the free list.
    pub fn record_return(&self) {
        self.available.fetch_add(1, Ordering::Relaxed);
    }

    /// An idle block was freed by teardown.
    pub fn record_reclaim(&self) {
        self.reclaimed.fetch_add(1, Ordering::Relaxed);
        self.available.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Default for AtomicPoolUsage {
    fn default() -> Self {
        Self::new()
    }
}
