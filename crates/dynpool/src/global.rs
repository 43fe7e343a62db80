//! Process-wide multipool with an explicit lifecycle.
//!
//! Nothing is created lazily: [`init`] must run before the first
//! [`acquire`], and [`teardown`] ends the context. Blocks acquired from the
//! global pool stay valid after teardown and are freed when dropped.

use parking_lot::RwLock;
use tracing::debug;

use crate::block::PooledBlock;
use crate::config::MultiPoolConfig;
use crate::error::{PoolError, Result};
use crate::multipool::{ClassUsage, MultiPool};

static GLOBAL_POOL: RwLock<Option<MultiPool>> = parking_lot::const_rwlock(None);

/// Create the global multipool with the default ladder.
pub fn init() -> Result<()> {
    init_with(&MultiPoolConfig::default())
}

/// Create the global multipool from `config`.
pub fn init_with(config: &MultiPoolConfig) -> Result<()> {
    let mut global = GLOBAL_POOL.write();
    if global.is_some() {
        return Err(PoolError::AlreadyInitialized);
    }
    *global = Some(MultiPool::with_config(config)?);
    debug!("global pool initialized");
    Ok(())
}

/// Whether the global multipool is live.
#[must_use]
pub fn is_initialized() -> bool {
    GLOBAL_POOL.read().is_some()
}

/// Acquire a block of at least `size` bytes from the global multipool.
pub fn acquire(size: usize) -> Result<PooledBlock> {
    GLOBAL_POOL
        .read()
        .as_ref()
        .ok_or(PoolError::NotInitialized)?
        .acquire(size)
}

/// Return a block to the pool that issued it.
pub fn release(block: PooledBlock) {
    block.release();
}

/// Per-class usage counters of the global multipool, if tracked.
pub fn usage() -> Result<Option<Vec<ClassUsage>>> {
    Ok(GLOBAL_POOL
        .read()
        .as_ref()
        .ok_or(PoolError::NotInitialized)?
        .usage())
}

/// Destroy the global multipool.
pub fn teardown() -> Result<()> {
    let multipool = GLOBAL_POOL.write().take().ok_or(PoolError::NotInitialized)?;
    multipool.destroy();
    debug!("global pool torn down");
    Ok(())
}
