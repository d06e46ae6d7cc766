use thiserror::Error;

/// Rejected engine configuration.
///
/// Only raised outside the audio callback; realtime contract violations are
/// assertions, not errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be a positive, finite number of Hz (got {0})")]
    InvalidSampleRate(f64),
    #[error("block size must be at least one frame")]
    EmptyBlockSize,
    #[error("block size {size} exceeds the maximum of {max} frames")]
    BlockSizeTooLarge { size: usize, max: usize },
}
