//! Error types for the floodgate crate.

use thiserror::Error;

/// Main error type for floodgate operations.
///
/// Construction is the only fallible path: an admission check always
/// returns a verdict, never an error.
#[derive(Error, Debug)]
pub enum FloodgateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for floodgate operations.
pub type Result<T> = std::result::Result<T, FloodgateError>;
