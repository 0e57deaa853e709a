//! Error types for ripieno-core.

use thiserror::Error;

/// Error type for ripieno-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid parameter range: min={min}, max={max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Invalid MIDI channel: {0}. Must be between 0 and 15")]
    InvalidChannel(i32),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
