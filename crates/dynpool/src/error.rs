//! Error types for pool construction and acquisition.

/// Errors surfaced by pools and the global pool context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The system allocator could not provide a block or a slot for it.
    #[error("allocation of {size} bytes failed")]
    AllocationFailure {
        /// Number of bytes that were requested from the system allocator.
        size: usize,
    },

    /// The requested size is larger than the largest size class.
    #[error("requested {requested} bytes exceeds largest size class of {max} bytes")]
    SizeClassOutOfRange {
        /// Size asked for by the caller.
        requested: usize,
        /// Block size of the largest class.
        max: usize,
    },

    /// A pool cannot be built with this block size.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The global pool context was used before `init` or after `teardown`.
    #[error("global pool is not initialized")]
    NotInitialized,

    /// `init` was called while the global pool context was live.
    #[error("global pool is already initialized")]
    AlreadyInitialized,

    /// A write would overflow a fixed-capacity buffer.
    #[error("capacity exceeded: {requested} bytes requested, {capacity} available")]
    CapacityExceeded {
        /// Remaining capacity of the buffer.
        capacity: usize,
        /// Number of bytes the caller tried to write.
        requested: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = PoolError::SizeClassOutOfRange {
            requested: 5_000_000,
            max: 4_194_304,
        };
        assert_eq!(
            err.to_string(),
            "requested 5000000 bytes exceeds largest size class of 4194304 bytes"
        );
        assert_eq!(
            PoolError::NotInitialized.to_string(),
            "global pool is not initialized"
        );
        assert_eq!(
            PoolError::AllocationFailure { size: 512 }.to_string(),
            "allocation of 512 bytes failed"
        );
    }
}
