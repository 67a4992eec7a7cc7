//! Crate error types.
//!
//! Negotiation itself never fails: malformed media ranges are dropped inside
//! the pipeline (see [`crate::negotiation::ParseError`]). [`ConnegError`]
//! covers the surfaces around it: configuration, request signing, the
//! upstream HTTP client and the server.

use thiserror::Error;

#[cfg(feature = "crypto")]
use crate::auth::SignError;

/// Conneg errors.
#[derive(Error, Debug)]
pub enum ConnegError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Request signing failed.
    ///
    /// The underlying [`SignError`] is kept as the error source.
    #[cfg(feature = "crypto")]
    #[error("Signing error: {0}")]
    Signing(#[source] SignError),

    /// Network communication error.
    #[error("Network error: {0}")]
    Network(String),

    /// Server-side error.
    #[error("Server error: {0}")]
    Server(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for conneg operations
pub type Result<T> = std::result::Result<T, ConnegError>;

#[cfg(feature = "crypto")]
impl From<SignError> for ConnegError {
    fn from(err: SignError) -> Self {
        ConnegError::Signing(err)
    }
}

impl From<reqwest::Error> for ConnegError {
    fn from(err: reqwest::Error) -> Self {
        ConnegError::Network(err.to_string())
    }
}

impl From<toml::de::Error> for ConnegError {
    fn from(err: toml::de::Error) -> Self {
        ConnegError::Config(err.to_string())
    }
}
