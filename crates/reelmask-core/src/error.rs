//! Error types for ReelMask.

use thiserror::Error;

/// Main error type for ReelMask core and media operations.
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The video cannot be opened, seeked or decoded.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ReelMask operations.
pub type Result<T> = std::result::Result<T, ReelError>;
