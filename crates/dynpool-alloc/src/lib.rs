//! # dynpool-alloc
//!
//! Scratch-buffer allocation hooks for streaming consumers of `dynpool`:
//! a pluggable [`ScratchAllocator`] with pooled, global, heap, and
//! heap-fallback implementations, plus the fixed-capacity [`PooledBytes`].
#![warn(missing_docs)]

pub mod allocator;
pub mod bytes;

pub use allocator::{
    FallbackAllocator, GlobalAllocator, HeapAllocator, PoolAllocator, ScratchAllocator, ScratchBuf,
};
pub use bytes::PooledBytes;
