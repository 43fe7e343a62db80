//! Multi-size pool built from a ladder of single-size pools.
//!
//! Requests are rounded up to the next power-of-two class and served by that
//! class's [`SinglePool`]. Rounding costs memory when sizes do not match a
//! class exactly; power-of-two requests waste nothing.

use tracing::debug;

use crate::block::PooledBlock;
use crate::config::MultiPoolConfig;
use crate::error::{PoolError, Result};
use crate::pool::SinglePool;
use crate::size_class;
use crate::stats::PoolUsage;

/// Usage counters of one size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassUsage {
    /// Block size of the class.
    pub block_size: usize,
    /// Counters of the class pool.
    pub usage: PoolUsage,
}

/// Table of [`SinglePool`]s, one per size class.
#[derive(Debug, Clone)]
pub struct MultiPool {
    pools: Box<[SinglePool]>,
    min_class_bits: u32,
}

impl MultiPool {
    /// Create the default ladder: 14 classes from 512 bytes to 4 MiB.
    pub fn new() -> Result<Self> {
        Self::with_config(&MultiPoolConfig::default())
    }

    /// Create a multipool from `config`.
    ///
    /// Either every class pool is built or the call fails.
    pub fn with_config(config: &MultiPoolConfig) -> Result<Self> {
        config.validate()?;
        let pool_config = config.pool_config();
        let pools = (0..config.class_count)
            .map(|index| {
                SinglePool::with_config(
                    size_class::class_size(index, config.min_class_bits),
                    &pool_config,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            classes = config.class_count,
            min_block = size_class::class_size(0, config.min_class_bits),
            track_usage = config.track_usage,
            "creating multipool"
        );
        Ok(Self {
            pools: pools.into_boxed_slice(),
            min_class_bits: config.min_class_bits,
        })
    }

    /// Class index a request of `size` bytes maps to.
    ///
    /// May be past the last class; [`acquire`](Self::acquire) rejects those.
    #[must_use]
    pub fn class_for(&self, size: usize) -> usize {
        size_class::class_for(size, self.min_class_bits)
    }

    /// Block size of class `index`.
    #[must_use]
    pub fn class_size(&self, index: usize) -> usize {
        size_class::class_size(index, self.min_class_bits)
    }

    /// Number of size classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.pools.len()
    }

    /// Largest request the multipool can serve.
    #[must_use]
    pub fn max_block_size(&self) -> usize {
        self.class_size(self.pools.len() - 1)
    }

    /// Pool of class `index`.
    #[must_use]
    pub fn pool(&self, index: usize) -> Option<&SinglePool> {
        self.pools.get(index)
    }

    /// Acquire a block of at least `size` bytes.
    ///
    /// The block is as large as the chosen class. Sizes above the largest
    /// class fail with [`PoolError::SizeClassOutOfRange`]; there is no
    /// fallback to an unpooled allocation. Release the block by dropping it.
    pub fn acquire(&self, size: usize) -> Result<PooledBlock> {
        match self.pools.get(self.class_for(size)) {
            Some(pool) => pool.acquire(),
            None => Err(PoolError::SizeClassOutOfRange {
                requested: size,
                max: self.max_block_size(),
            }),
        }
    }

    /// Per-class usage counters, if tracking is enabled.
    #[must_use]
    pub fn usage(&self) -> Option<Vec<ClassUsage>> {
        self.pools
            .iter()
            .map(|pool| {
                pool.usage().map(|usage| ClassUsage {
                    block_size: pool.block_size(),
                    usage,
                })
            })
            .collect()
    }

    /// Free every idle block in every class; returns how many were freed.
    pub fn destroy_all(&self) -> usize {
        self.pools.iter().map(SinglePool::destroy_all).sum()
    }

    /// Tear down every class pool.
    pub fn destroy(self) {
        let freed = self.destroy_all();
        debug!(freed, "multipool destroyed");
    }
}
