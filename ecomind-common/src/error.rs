//! Common error types for EcoMind

use thiserror::Error;

/// Common result type for EcoMind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across EcoMind components
///
/// Every failing operation leaves session state untouched, so callers can
/// surface these directly to the user.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (empty appliance, non-positive hours, bad upload)
    #[error("{0}")]
    Validation(String),

    /// Classifier model not loaded or inference failed
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Uploaded bytes could not be decoded as an image
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
