//! Error types for the router.

use thiserror::Error;

/// Main error type for router operations.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RouterError {
    /// True for every error caused by a bad caller-supplied argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            RouterError::InvalidArgument(_) | RouterError::InvalidPattern { .. }
        )
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(e: serde_json::Error) -> Self {
        RouterError::Serialization(e.to_string())
    }
}

/// Result type for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
