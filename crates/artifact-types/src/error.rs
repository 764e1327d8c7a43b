//! Error types shared across the artifact index.

use thiserror::Error;

/// Errors raised while building domain values or loading settings.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A repository path could not be mapped to coordinates
    #[error("Invalid artifact path: {0}")]
    InvalidPath(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
