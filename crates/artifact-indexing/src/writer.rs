//! Index writer capability consumed by the rebuild pipeline.
//!
//! The pipeline only ever purges, appends batches and packs. Anything that can
//! do those three things can back a rebuild.

use std::path::Path;

use artifact_types::{IndexEntry, RepositoryIdentity};

use crate::error::IndexingError;

/// What is being indexed, passed along with every batch.
#[derive(Debug, Clone)]
pub struct IndexingContext {
    pub repository: RepositoryIdentity,
}

impl IndexingContext {
    pub fn new(repository: RepositoryIdentity) -> Self {
        Self { repository }
    }

    /// Directory of the index being written.
    pub fn index_location(&self) -> &Path {
        &self.repository.index_location
    }

    /// `storage:repository` label stored with every document.
    pub fn label(&self) -> String {
        self.repository.to_string()
    }
}

/// Narrow capability over a search index.
pub trait IndexWriter: Send + Sync {
    /// Clear or reinitialize the index at `location`.
    fn purge(&self, location: &Path) -> Result<(), IndexingError>;

    /// Append a batch. An empty batch must be accepted as a no-op.
    ///
    /// Returns the number of documents stored; entries sharing a `uinfo`
    /// count once.
    fn add_entries(
        &self,
        batch: &[IndexEntry],
        context: &IndexingContext,
    ) -> Result<usize, IndexingError>;

    /// Finalize the index at `location` for read access.
    fn pack(&self, location: &Path, context: &IndexingContext) -> Result<(), IndexingError>;

    /// Drop anything held open for `location` after a rebuild stopped before
    /// packing. Releasing a location with nothing held is a no-op.
    fn release(&self, location: &Path);

    /// Get the name of this writer for logging.
    fn name(&self) -> &str;
}
