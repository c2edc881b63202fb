//! services/client/src/error.rs
//!
//! Defines the top-level error type for the client service.

use crate::config::ConfigError;

/// The primary error type for the `client` service.
///
/// Only startup and terminal I/O failures surface as `ClientError`. Failures of
/// individual network calls become typed outcomes in the session store and the
/// interaction controller instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., reading the terminal).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
