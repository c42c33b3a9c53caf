//! Error types for the framing advisor

use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the framing advisor
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (invalid settings, missing oracle credential)
    #[error("configuration error: {0}")]
    Config(String),

    /// Oracle endpoint unreachable, non-2xx, or returned no usable choice
    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Oracle text could not be interpreted as a directive
    #[error("response format error: {0}")]
    ResponseFormat(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
