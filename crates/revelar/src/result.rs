//! Result and error types for Revelar.

use thiserror::Error;

/// Result type for Revelar operations
pub type RevelarResult<T> = Result<T, RevelarError>;

/// Errors that can occur in Revelar
#[derive(Debug, Error)]
pub enum RevelarError {
    /// Malformed manifest content or test identity
    #[error("Format error: {message}")]
    Format {
        /// Error message
        message: String,
    },

    /// Operation called in the wrong state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Image decode or encode failure
    #[error("Image processing failed: {message}")]
    ImageProcessing {
        /// Error message
        message: String,
    },

    /// Animation container failure
    #[error("Animation encoding failed: {message}")]
    Animation {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
