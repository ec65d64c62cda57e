//! Error types for dockwatch.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dockwatch.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication failed (missing, invalid, or expired token).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Requested container does not exist.
    #[error("container not found: {0}")]
    NotFound(String),

    /// Docker engine call failed.
    #[error("docker error: {0}")]
    Docker(String),

    /// Log source failed mid-stream. Carries the engine's own message,
    /// which is shown to the client verbatim.
    #[error("{0}")]
    Source(String),

    /// Malformed client message.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Docker engine unreachable.
    #[error("docker unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
