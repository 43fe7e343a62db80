//! Pool configuration.

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::size_class::{CLASS_COUNT, MIN_CLASS_BITS};

/// Smallest accepted `min_class_bits` (8-byte blocks).
const MIN_CLASS_BITS_LOWER: u32 = 3;

/// Largest accepted `min_class_bits` (16 MiB blocks).
const MIN_CLASS_BITS_UPPER: u32 = 24;

/// Most classes a multipool may hold.
const MAX_CLASS_COUNT: usize = 24;

/// No class may exceed 2^31 bytes.
const MAX_CLASS_BITS: u32 = 31;

/// Settings for a single-size pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maintain allocated/available counters.
    pub track_usage: bool,
}

/// Settings for a multipool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiPoolConfig {
    /// Log2 of the smallest class's block size.
    pub min_class_bits: u32,
    /// Number of classes; class `i` holds `1 << (min_class_bits + i)` bytes.
    pub class_count: usize,
    /// Maintain allocated/available counters in every class.
    pub track_usage: bool,
}

impl Default for MultiPoolConfig {
    fn default() -> Self {
        Self {
            min_class_bits: MIN_CLASS_BITS,
            class_count: CLASS_COUNT,
            track_usage: false,
        }
    }
}

impl MultiPoolConfig {
    /// Default ladder with usage tracking enabled.
    #[must_use]
    pub fn tracked() -> Self {
        Self {
            track_usage: true,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PoolError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the ladder is buildable.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_CLASS_BITS_LOWER..=MIN_CLASS_BITS_UPPER).contains(&self.min_class_bits) {
            return Err(PoolError::Config(format!(
                "min_class_bits must be in {MIN_CLASS_BITS_LOWER}..={MIN_CLASS_BITS_UPPER}, got {}",
                self.min_class_bits
            )));
        }
        if !(1..=MAX_CLASS_COUNT).contains(&self.class_count) {
            return Err(PoolError::Config(format!(
                "class_count must be in 1..={MAX_CLASS_COUNT}, got {}",
                self.class_count
            )));
        }
        #[allow(clippy::cast_possible_truncation)]
        let top_bits = self.min_class_bits + self.class_count as u32 - 1;
        if top_bits > MAX_CLASS_BITS {
            return Err(PoolError::Config(format!(
                "largest class would be 2^{top_bits} bytes, limit is 2^{MAX_CLASS_BITS}"
            )));
        }
        Ok(())
    }

    /// Settings each class pool is built with.
    #[must_use]
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            track_usage: self.track_usage,
        }
    }
}
