//! Error types for yester-core.

use thiserror::Error;

use crate::config::ConfigValidationError;

/// Result type alias using yester-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for content resolution
#[derive(Error, Debug)]
pub enum Error {
    // Remote cache errors
    #[cfg(feature = "db")]
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Generative backend errors
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("No historical events could be generated")]
    NoEvents,

    #[error("No image generated in response")]
    NoImage,

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    // Local storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    // Resolution outcomes that are not failures of the pipeline itself
    #[error("Resolution was cancelled")]
    Cancelled,

    #[error("Resolution was superseded by a newer request")]
    Superseded,

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an API error from a status code and response body
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a timeout error
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the error is a remote/transport hiccup that callers degrade past
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            #[cfg(feature = "client")]
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            #[cfg(feature = "db")]
            Self::Database(_) => true,
            _ => false,
        }
    }
}
