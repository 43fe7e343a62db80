//! Single-size block pool.
//!
//! Idle blocks sit on a lock-free free list; acquiring pops one, releasing
//! pushes it back. An empty free list is not an error: the pool allocates a
//! fresh block and grows. Blocks are kept for reuse until the pool is torn
//! down, never handed back to the system allocator in between.
//!
//! The free list itself takes no lock. The one lock on the acquire and
//! release paths is the per-slot cell that parks an idle block's payload;
//! only the slot's current owner touches it, so it is never contended.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::arena::SlotArena;
use crate::block::PooledBlock;
use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::free_list::TaggedStack;
use crate::stats::{AtomicPoolUsage, PoolUsage};

/// State shared between a pool handle and every block it has issued.
pub(crate) struct PoolShared {
    block_size: usize,
    arena: SlotArena,
    /// Slots holding an idle block.
    free: TaggedStack,
    /// Slots whose block was reclaimed by teardown, reused before the arena grows.
    vacant: TaggedStack,
    usage: Option<AtomicPoolUsage>,
}

impl PoolShared {
    pub(crate) fn block_size(&self) -> usize {
        self.block_size
    }

    /// Park a released payload in its slot and make the slot available.
    pub(crate) fn put_back(&self, index: u32, payload: Box<[u8]>) {
        // Slots are never unpublished while a block referencing them exists.
        let slot = self.arena.get(index);
        debug_assert!(slot.is_some(), "released block names unpublished slot {index}");
        let Some(slot) = slot else {
            return;
        };
        slot.park(payload);
        // Count before publishing so a racing pop never decrements first.
        if let Some(usage) = &self.usage {
            usage.record_return();
        }
        self.free.push(index, slot);
    }

    fn allocate_fresh(self: &Arc<Self>) -> Result<PooledBlock> {
        let payload = alloc_payload(self.block_size)?;
        let index = match self.vacant.pop(&self.arena) {
            Some((index, _)) => index,
            None => match self.arena.reserve() {
                Some((index, _)) => index,
                None => {
                    warn!(block_size = self.block_size, "slot arena exhausted");
                    return Err(PoolError::AllocationFailure {
                        size: self.block_size,
                    });
                }
            },
        };
        if let Some(usage) = &self.usage {
            usage.record_alloc();
        }
        trace!(block_size = self.block_size, slot = index, "pool miss, allocated block");
        Ok(PooledBlock::new(payload, index, Arc::clone(self)))
    }
}

/// Allocate a zeroed payload, reporting failure instead of aborting.
fn alloc_payload(size: usize) -> Result<Box<[u8]>> {
    let mut payload = Vec::<u8>::new();
    if payload.try_reserve_exact(size).is_err() {
        warn!(size, "block allocation failed");
        return Err(PoolError::AllocationFailure { size });
    }
    payload.resize(size, 0);
    Ok(payload.into_boxed_slice())
}

/// Pool of blocks that all have the same size.
///
/// Cloning the handle shares the pool. `acquire` and `release` may be called
/// from any number of threads at once.
#[derive(Clone)]
pub struct SinglePool {
    shared: Arc<PoolShared>,
}

impl SinglePool {
    /// Create an empty pool of `block_size`-byte blocks without usage tracking.
    pub fn new(block_size: usize) -> Result<Self> {
        Self::with_config(block_size, &PoolConfig::default())
    }

    /// Create an empty pool of `block_size`-byte blocks.
    pub fn with_config(block_size: usize, config: &PoolConfig) -> Result<Self> {
        if block_size == 0 {
            return Err(PoolError::InvalidBlockSize(block_size));
        }
        debug!(block_size, track_usage = config.track_usage, "creating pool");
        Ok(Self {
            shared: Arc::new(PoolShared {
                block_size,
                arena: SlotArena::new(),
                free: TaggedStack::new(),
                vacant: TaggedStack::new(),
                usage: config.track_usage.then(AtomicPoolUsage::new),
            }),
        })
    }

    /// Size in bytes of every block this pool issues.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.shared.block_size
    }

    /// Take an idle block, or allocate a new one if none is idle.
    ///
    /// Fails only when the system allocator cannot provide a new block; the
    /// pool stays usable afterwards.
    pub fn acquire(&self) -> Result<PooledBlock> {
        let shared = &self.shared;
        while let Some((index, slot)) = shared.free.pop(&shared.arena) {
            let payload = slot.unpark();
            debug_assert!(payload.is_some(), "idle slot {index} had no payload");
            if let Some(payload) = payload {
                if let Some(usage) = &shared.usage {
                    usage.record_reuse();
                }
                return Ok(PooledBlock::new(payload, index, Arc::clone(shared)));
            }
            shared.vacant.push(index, slot);
        }
        shared.allocate_fresh()
    }

    /// Return a block to the pool it came from.
    ///
    /// Equivalent to dropping the block. The block must have been issued by
    /// this pool; this is checked in debug builds only.
    pub fn release(&self, block: PooledBlock) {
        debug_assert!(
            self.owns(&block),
            "block of {} bytes released into a foreign pool",
            block.block_size()
        );
        drop(block);
    }

    /// Whether `block` was issued by this pool.
    #[must_use]
    pub fn owns(&self, block: &PooledBlock) -> bool {
        Arc::ptr_eq(&self.shared, block.owner())
    }

    /// Free the memory of every idle block and return how many were freed.
    ///
    /// Blocks still held by callers are untouched and return to the pool as
    /// usual when released. Only a quiescent pool is guaranteed to be left
    /// with no idle blocks.
    pub fn destroy_all(&self) -> usize {
        let shared = &self.shared;
        let mut freed = 0;
        while let Some((index, slot)) = shared.free.pop(&shared.arena) {
            drop(slot.unpark());
            shared.vacant.push(index, slot);
            if let Some(usage) = &shared.usage {
                usage.record_reclaim();
            }
            freed += 1;
        }
        debug!(block_size = shared.block_size, freed, "pool drained");
        freed
    }

    /// Tear the pool down, freeing every idle block.
    ///
    /// The arena itself is freed once the last outstanding block is dropped.
    pub fn destroy(self) {
        self.destroy_all();
    }

    /// Whether the free list is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.free.is_empty()
    }

    /// Usage counters, if the pool was built with tracking enabled.
    #[must_use]
    pub fn usage(&self) -> Option<PoolUsage> {
        self.shared.usage.as_ref().map(AtomicPoolUsage::snapshot)
    }

    /// Reset the usage event counters, if tracked.
    ///
    /// The idle-block count in `available` is not reset.
    pub fn reset_usage(&self) {
        if let Some(usage) = &self.shared.usage {
            usage.reset();
        }
    }

    /// Number of slots the pool has ever handed out.
    #[must_use]
    pub fn slots(&self) -> u32 {
        self.shared.arena.reserved()
    }
}

impl fmt::Debug for SinglePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinglePool")
            .field("block_size", &self.shared.block_size)
            .field("slots", &self.shared.arena.reserved())
            .field("usage", &self.usage())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(block_size: usize) -> SinglePool {
        SinglePool::with_config(block_size, &PoolConfig { track_usage: true }).unwrap()
    }

    #[test]
    fn zero_block_size_rejected() {
        assert_eq!(
            SinglePool::new(0).unwrap_err(),
            PoolError::InvalidBlockSize(0)
        );
    }

    #[test]
    fn acquired_block_is_full_size_and_writable() {
        let pool = SinglePool::new(100).unwrap();
        let mut block = pool.acquire().unwrap();
        assert_eq!(block.len(), 100);
        assert_eq!(block.block_size(), 100);
        for (i, byte) in block.iter_mut().enumerate() {
            *byte = (i % 251) as u8;
        }
        for (i, byte) in block.iter().enumerate() {
            assert_eq!(*byte, (i % 251) as u8);
        }
    }

    #[test]
    fn release_then_acquire_returns_same_block() {
        let pool = SinglePool::new(64).unwrap();
        let mut block = pool.acquire().unwrap();
        block[..3].copy_from_slice(b"abc");
        let ptr = block.as_ptr();
        pool.release(block);

        let again = pool.acquire().unwrap();
        assert_eq!(again.as_ptr(), ptr);
        // Contents survive recycling.
        assert_eq!(&again[..3], b"abc");
    }

    #[test]
    fn empty_pool_grows() {
        let pool = tracked(32);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_ne!(a.as_ptr(), b.as_ptr());
        assert_eq!(pool.slots(), 2);
        let usage = pool.usage().unwrap();
        assert_eq!(usage.allocated, 2);
        assert_eq!(usage.in_use(), 2);
    }

    #[test]
    fn usage_counts_reuse() {
        let pool = tracked(32);
        let block = pool.acquire().unwrap();
        drop(block);
        assert_eq!(pool.usage().unwrap().available, 1);
        let _block = pool.acquire().unwrap();
        let usage = pool.usage().unwrap();
        assert_eq!(usage.allocated, 1);
        assert_eq!(usage.reused, 1);
        assert_eq!(usage.available, 0);
        pool.reset_usage();
        assert_eq!(pool.usage().unwrap(), PoolUsage::default());
    }

    #[test]
    fn reset_with_idle_blocks_keeps_available_consistent() {
        let pool = tracked(32);
        drop(pool.acquire().unwrap());
        pool.reset_usage();
        assert_eq!(pool.usage().unwrap().available, 1);

        let block = pool.acquire().unwrap();
        let usage = pool.usage().unwrap();
        assert_eq!(usage.available, 0);
        assert_eq!(usage.reused, 1);

        drop(block);
        pool.reset_usage();
        assert_eq!(pool.destroy_all(), 1);
        let usage = pool.usage().unwrap();
        assert_eq!(usage.available, 0);
        assert_eq!(usage.reclaimed, 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unpublished slot")]
    fn releasing_unpublished_slot_asserts() {
        let pool = SinglePool::new(8).unwrap();
        let stray = PooledBlock::new(vec![0; 8].into_boxed_slice(), 7, Arc::clone(&pool.shared));
        drop(stray);
    }

    #[test]
    fn allocation_failure_leaves_pool_usable() {
        let pool = tracked(usize::MAX / 2);
        for _ in 0..2 {
            assert_eq!(
                pool.acquire().unwrap_err(),
                PoolError::AllocationFailure {
                    size: usize::MAX / 2
                }
            );
            assert_eq!(pool.slots(), 0);
            assert!(pool.is_empty());
            let usage = pool.usage().unwrap();
            assert_eq!(usage.allocated, 0);
            assert_eq!(usage.available, 0);
        }
    }

    #[test]
    fn untracked_pool_has_no_usage() {
        let pool = SinglePool::new(8).unwrap();
        assert!(pool.usage().is_none());
    }

    #[test]
    fn owns_distinguishes_pools() {
        let a = SinglePool::new(16).unwrap();
        let b = SinglePool::new(16).unwrap();
        let block = a.acquire().unwrap();
        assert!(a.owns(&block));
        assert!(!b.owns(&block));
        assert!(a.clone().owns(&block));
    }

    #[test]
    fn destroy_all_frees_idle_blocks() {
        let pool = tracked(128);
        let blocks: Vec<_> = (0..5).map(|_| pool.acquire().unwrap()).collect();
        let mut blocks = blocks.into_iter();
        for block in blocks.by_ref().take(3) {
            block.release();
        }
        assert_eq!(pool.destroy_all(), 3);
        assert!(pool.is_empty());

        // Outstanding blocks still come home after teardown of the idle ones.
        for block in blocks {
            block.release();
        }
        assert_eq!(pool.destroy_all(), 2);
        let usage = pool.usage().unwrap();
        assert_eq!(usage.reclaimed, 5);
        assert_eq!(usage.available, 0);
        assert_eq!(usage.in_use(), 0);
    }

    #[test]
    fn reclaimed_slots_are_reused() {
        let pool = SinglePool::new(16).unwrap();
        let blocks: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
        drop(blocks);
        pool.destroy_all();
        let again: Vec<_> = (0..4).map(|_| pool.acquire().unwrap()).collect();
        assert_eq!(again.len(), 4);
        assert_eq!(pool.slots(), 4);
    }

    #[test]
    fn block_outlives_destroyed_pool() {
        let pool = SinglePool::new(16).unwrap();
        let mut block = pool.acquire().unwrap();
        pool.destroy();
        block.fill(0xAB);
        assert!(block.iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn shared_across_threads() {
        let pool = tracked(256);
        std::thread::scope(|s| {
            for t in 0..4u8 {
                let pool = &pool;
                s.spawn(move || {
                    for _ in 0..1_000 {
                        let mut block = pool.acquire().unwrap();
                        block.fill(t);
                        assert!(block.iter().all(|&b| b == t));
                    }
                });
            }
        });
        let usage = pool.usage().unwrap();
        assert!(usage.allocated <= 4);
        assert_eq!(usage.in_use(), 0);
    }
}
