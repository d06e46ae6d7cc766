#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, MAX_BLOCK_SIZE};

/// Fixed playback settings a graph is built for.
///
/// Sample rate and block size are chosen once, before any node is
/// constructed, and never change for the lifetime of those nodes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f64,
    pub block_size: usize,
    /// Offline bounce rather than live playback
    pub rendering: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 512,
            rendering: false,
        }
    }
}

impl EngineConfig {
    pub fn new(sample_rate: f64, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size,
            rendering: false,
        }
    }

    pub fn rendering(mut self, rendering: bool) -> Self {
        self.rendering = rendering;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.block_size == 0 {
            return Err(ConfigError::EmptyBlockSize);
        }
        if self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSizeTooLarge {
                size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(())
    }
}
