//! Fixed-capacity byte buffer over scratch memory.
//!
//! `PooledBytes` starts empty with a capacity equal to the requested size
//! (not the class size), and never reallocates. Power-of-two capacities use
//! the underlying block without waste.

use std::io;
use std::ops::{Deref, DerefMut};

use dynpool::{PoolError, Result};

use crate::allocator::{ScratchAllocator, ScratchBuf};

/// Length-tracked view over a [`ScratchBuf`].
#[derive(Debug)]
pub struct PooledBytes {
    buf: ScratchBuf,
    len: usize,
    capacity: usize,
}

impl PooledBytes {
    /// Acquire an empty buffer able to hold `capacity` bytes.
    pub fn acquire(alloc: &dyn ScratchAllocator, capacity: usize) -> Result<Self> {
        let buf = alloc.alloc(capacity)?;
        debug_assert!(buf.len() >= capacity);
        Ok(Self {
            buf,
            len: 0,
            capacity,
        })
    }

    /// Number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bytes have been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fixed capacity of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that can still be written.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.len
    }

    /// Written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Written bytes, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    /// Append `data`, failing without writing anything if it does not fit.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.remaining() {
            return Err(PoolError::CapacityExceeded {
                capacity: self.remaining(),
                requested: data.len(),
            });
        }
        self.buf[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
        Ok(())
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.extend_from_slice(&[byte])
    }

    /// Region between the written bytes and the capacity.
    ///
    /// Holds stale data from earlier users of the block; commit bytes written
    /// here with [`set_len`](Self::set_len).
    pub fn spare_capacity_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..self.capacity]
    }

    /// Set the number of written bytes.
    pub fn set_len(&mut self, len: usize) -> Result<()> {
        if len > self.capacity {
            return Err(PoolError::CapacityExceeded {
                capacity: self.capacity,
                requested: len,
            });
        }
        self.len = len;
        Ok(())
    }

    /// Shorten to `len` bytes; no-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Forget all written bytes.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Give back the underlying scratch buffer.
    #[must_use]
    pub fn into_inner(self) -> ScratchBuf {
        self.buf
    }
}

impl Deref for PooledBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl DerefMut for PooledBytes {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl io::Write for PooledBytes {
    /// Writes as much of `data` as fits; returns 0 once full.
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = data.len().min(self.remaining());
        self.buf[self.len..self.len + n].copy_from_slice(&data[..n]);
        self.len += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
