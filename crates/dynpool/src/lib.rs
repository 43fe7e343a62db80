//! # dynpool
//!
//! Lock-free pooled allocation of fixed-size blocks.
//!
//! A [`SinglePool`] recycles blocks of one size through a lock-free free
//! list. A [`MultiPool`] maps arbitrary request sizes onto a ladder of
//! power-of-two single pools, and [`global`] holds one process-wide
//! multipool with an explicit init/teardown lifecycle.
//!
//! ```
//! let multipool = dynpool::MultiPool::new().unwrap();
//! let block = multipool.acquire(3000).unwrap();
//! assert_eq!(block.len(), 4096);
//! ```
#![warn(missing_docs)]

mod arena;
pub mod block;
pub mod config;
pub mod error;
mod free_list;
pub mod global;
pub mod multipool;
pub mod pool;
pub mod size_class;
pub mod stats;

pub use block::PooledBlock;
pub use config::{MultiPoolConfig, PoolConfig};
pub use error::{PoolError, Result};
pub use multipool::{ClassUsage, MultiPool};
pub use pool::SinglePool;
pub use stats::PoolUsage;
