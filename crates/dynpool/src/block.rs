//! Pooled block handle.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::pool::PoolShared;

/// A fixed-size block checked out of a [`SinglePool`](crate::SinglePool).
///
/// The handle carries a reference to its owning pool, so dropping it (or
/// calling [`release`](Self::release)) always returns the block to the pool
/// that produced it. Contents are not cleared between uses: a recycled block
/// holds whatever its previous user wrote.
pub struct PooledBlock {
    payload: Box<[u8]>,
    slot: u32,
    pool: Arc<PoolShared>,
}

impl PooledBlock {
    pub(crate) fn new(payload: Box<[u8]>, slot: u32, pool: Arc<PoolShared>) -> Self {
        debug_assert_eq!(payload.len(), pool.block_size());
        Self {
            payload,
            slot,
            pool,
        }
    }

    /// Size in bytes of the block, equal to the owning pool's block size.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.payload.len()
    }

    /// Address of the first payload byte. Stable across recycling.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.payload.as_ptr()
    }

    /// Return the block to its pool.
    pub fn release(self) {
        drop(self);
    }

    pub(crate) fn owner(&self) -> &Arc<PoolShared> {
        &self.pool
    }
}

impl Deref for PooledBlock {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.payload
    }
}

impl DerefMut for PooledBlock {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.payload
    }
}

impl AsRef<[u8]> for PooledBlock {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}

impl AsMut<[u8]> for PooledBlock {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.payload
    }
}

impl fmt::Debug for PooledBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBlock")
            .field("block_size", &self.payload.len())
            .field("slot", &self.slot)
            .field("ptr", &self.payload.as_ptr())
            .finish()
    }
}

impl Drop for PooledBlock {
    fn drop(&mut self) {
        let payload = std::mem::take(&mut self.payload);
        self.pool.put_back(self.slot, payload);
    }
}
