//! Error types for the rebuild pipeline.

use std::fmt;

use artifact_search::SearchError;
use artifact_storage::StorageError;
use thiserror::Error;

/// Failures raised by the pipeline's collaborators.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Metadata store count/fetch failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Index writer purge/add/pack failed
    #[error("Writer failure: {0}")]
    WriterFailure(String),

    /// Duplicate (storage, repository, name) on a store write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<StorageError> for IndexingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConstraintViolation { .. } => {
                IndexingError::ConstraintViolation(err.to_string())
            }
            other => IndexingError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<SearchError> for IndexingError {
    fn from(err: SearchError) -> Self {
        IndexingError::WriterFailure(err.to_string())
    }
}

/// Stage of a rebuild at which it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RebuildStage {
    Purge,
    Paging,
    Sealing,
}

impl fmt::Display for RebuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildStage::Purge => write!(f, "purge"),
            RebuildStage::Paging => write!(f, "paging"),
            RebuildStage::Sealing => write!(f, "sealing"),
        }
    }
}

/// Outcome of a failed rebuild.
///
/// The index of a failed rebuild is unreliable (empty or partially populated)
/// until a later rebuild succeeds.
#[derive(Error, Debug)]
pub enum RebuildError {
    /// A collaborator failed; nothing after `stage` ran
    #[error("Rebuild of {repository} failed during {stage}: {source}")]
    Failed {
        repository: String,
        stage: RebuildStage,
        #[source]
        source: IndexingError,
    },

    /// The cancellation token fired between pages
    #[error("Rebuild of {repository} cancelled during {stage}")]
    Cancelled {
        repository: String,
        stage: RebuildStage,
    },

    /// Another rebuild of the same repository holds the lease
    #[error("Rebuild of {0} already running")]
    AlreadyRunning(String),
}

impl RebuildError {
    /// Stage the rebuild stopped at, if it got as far as starting.
    pub fn stage(&self) -> Option<RebuildStage> {
        match self {
            RebuildError::Failed { stage, .. } | RebuildError::Cancelled { stage, .. } => {
                Some(*stage)
            }
            RebuildError::AlreadyRunning(_) => None,
        }
    }
}
