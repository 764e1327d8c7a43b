//! Metadata store adapter backed by RocksDB storage.

use std::sync::Arc;

use artifact_storage::Storage;
use artifact_types::ArtifactGroup;

use crate::error::IndexingError;
use crate::fetcher::GroupSource;

/// Serves group counts and pages straight from [`Storage`].
pub struct StorageGroupSource {
    storage: Arc<Storage>,
}

impl StorageGroupSource {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Get the underlying storage reference.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }
}

impl GroupSource for StorageGroupSource {
    fn count(&self, storage_id: &str, repository_id: &str) -> Result<u64, IndexingError> {
        Ok(self.storage.count_groups(storage_id, repository_id)?)
    }

    fn fetch_groups(
        &self,
        storage_id: &str,
        repository_id: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ArtifactGroup>, IndexingError> {
        Ok(self
            .storage
            .list_groups(storage_id, repository_id, offset, limit)?)
    }
}
