//! Error types for SeedScope.
//!
//! Library crates use [`SeedScopeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SeedScope operations.
#[derive(Debug, thiserror::Error)]
pub enum SeedScopeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the keyword provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered, but reported a failure in its response envelope.
    #[error("provider error {status_code}: {message}")]
    Provider { status_code: u32, message: String },

    /// Response body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (blank seed, bad option value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SeedScopeError>;

impl SeedScopeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a provider error from an envelope status.
    pub fn provider(status_code: u32, msg: impl Into<String>) -> Self {
        Self::Provider {
            status_code,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
