//! Error types for the inference and sampling subsystem.

use reelmask_core::ReelError;
use thiserror::Error;

/// Errors that can occur in inference and extraction.
#[derive(Debug, Error)]
pub enum AiError {
    /// The model file does not exist.
    #[error("Model not found: {path}")]
    ModelNotFound { path: String },

    /// The model exists but could not be turned into a runnable session.
    #[error("Model load failed for {path}: {reason}")]
    ModelLoadFailed { path: String, reason: String },

    /// Raw model output is not a whole number of 6-float records.
    #[error("Malformed model output: {len} floats is not a multiple of 6")]
    MalformedOutput { len: usize },

    /// The inference backend failed while running a frame.
    #[error("Inference backend error: {0}")]
    Backend(String),

    /// Preprocessing error (frame conversion, tensor shape, etc.).
    #[error("Preprocessing error: {0}")]
    PreprocessError(String),

    /// Thumbnail encoding failed.
    #[error("Thumbnail encoding error: {0}")]
    Thumbnail(String),

    /// Seek or decode failed during extraction. Aborts the whole run.
    #[error("Source unavailable at {time_secs:.3}s: {reason}")]
    SourceUnavailable { time_secs: f64, reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] ReelError),
}

/// Result type alias for AI operations.
pub type AiResult<T> = std::result::Result<T, AiError>;
