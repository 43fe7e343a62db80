//! Allocator trait and implementations.
//!
//! A streaming consumer takes its scratch buffers through [`ScratchAllocator`]
//! so it can run on a private multipool, the global pool, or the plain heap.

use std::ops::{Deref, DerefMut};

use dynpool::{MultiPool, MultiPoolConfig, PoolError, PooledBlock, Result};

/// Scratch memory handed out by a [`ScratchAllocator`].
///
/// Dropping a pooled buffer returns its block to the owning pool.
#[derive(Debug)]
pub enum ScratchBuf {
    /// Block recycled through a pool.
    Pooled(PooledBlock),
    /// Unpooled heap allocation.
    Heap(Box<[u8]>),
}

impl ScratchBuf {
    /// Whether the buffer came from a pool.
    #[must_use]
    pub fn is_pooled(&self) -> bool {
        matches!(self, Self::Pooled(_))
    }
}

impl Deref for ScratchBuf {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Pooled(block) => &block[..],
            Self::Heap(buf) => &buf[..],
        }
    }
}

impl DerefMut for ScratchBuf {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Pooled(block) => &mut block[..],
            Self::Heap(buf) => &mut buf[..],
        }
    }
}

/// Source of scratch buffers.
pub trait ScratchAllocator: Send + Sync {
    /// Allocate a buffer of at least `size` bytes.
    fn alloc(&self, size: usize) -> Result<ScratchBuf>;

    /// Allocate room for `items` elements of `item_size` bytes each.
    ///
    /// This is the shape of a compression library's custom allocation hook.
    fn zalloc(&self, items: usize, item_size: usize) -> Result<ScratchBuf> {
        let size = items
            .checked_mul(item_size)
            .ok_or(PoolError::AllocationFailure { size: usize::MAX })?;
        self.alloc(size)
    }
}

/// Allocator backed by a private multipool.
#[derive(Debug, Clone)]
pub struct PoolAllocator {
    pool: MultiPool,
}

impl PoolAllocator {
    /// Create an allocator over the default size-class ladder.
    pub fn new() -> Result<Self> {
        Ok(Self {
            pool: MultiPool::new()?,
        })
    }

    /// Create an allocator over a configured ladder.
    pub fn with_config(config: &MultiPoolConfig) -> Result<Self> {
        Ok(Self {
            pool: MultiPool::with_config(config)?,
        })
    }

    /// The underlying multipool.
    #[must_use]
    pub fn pool(&self) -> &MultiPool {
        &self.pool
    }
}

impl From<MultiPool> for PoolAllocator {
    fn from(pool: MultiPool) -> Self {
        Self { pool }
    }
}

impl ScratchAllocator for PoolAllocator {
    fn alloc(&self, size: usize) -> Result<ScratchBuf> {
        self.pool.acquire(size).map(ScratchBuf::Pooled)
    }
}

/// Allocator backed by the process-wide pool in [`dynpool::global`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalAllocator;

impl ScratchAllocator for GlobalAllocator {
    fn alloc(&self, size: usize) -> Result<ScratchBuf> {
        dynpool::global::acquire(size).map(ScratchBuf::Pooled)
    }
}

/// Allocator that takes every buffer straight from the heap.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapAllocator;

impl ScratchAllocator for HeapAllocator {
    fn alloc(&self, size: usize) -> Result<ScratchBuf> {
        let mut buf = Vec::<u8>::new();
        buf.try_reserve_exact(size)
            .map_err(|_| PoolError::AllocationFailure { size })?;
        buf.resize(size, 0);
        Ok(ScratchBuf::Heap(buf.into_boxed_slice()))
    }
}

/// Pooled allocation with a heap fallback for sizes above the largest class.
///
/// Any other error from the primary allocator is passed through.
#[derive(Debug, Clone, Default)]
pub struct FallbackAllocator<A> {
    primary: A,
}

impl<A: ScratchAllocator> FallbackAllocator<A> {
    /// Wrap `primary` with a heap fallback.
    pub fn new(primary: A) -> Self {
        Self { primary }
    }

    /// The wrapped allocator.
    pub fn primary(&self) -> &A {
        &self.primary
    }
}

impl<A: ScratchAllocator> ScratchAllocator for FallbackAllocator<A> {
    fn alloc(&self, size: usize) -> Result<ScratchBuf> {
        match self.primary.alloc(size) {
            Err(PoolError::SizeClassOutOfRange { requested, max }) => {
                tracing::debug!(requested, max, "size above largest class, using heap");
                HeapAllocator.alloc(size)
            }
            other => other,
        }
    }
}
