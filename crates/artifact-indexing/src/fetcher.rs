//! Paged access to artifact-id groups in the metadata store.

use std::sync::Arc;

use tracing::debug;

use artifact_types::{ArtifactGroup, RepositoryIdentity};

use crate::error::IndexingError;

/// Read side of the metadata store.
pub trait GroupSource: Send + Sync {
    /// Total artifact-id groups in the repository.
    fn count(&self, storage_id: &str, repository_id: &str) -> Result<u64, IndexingError>;

    /// Deterministic page of groups. A page past the end is empty, not an error.
    fn fetch_groups(
        &self,
        storage_id: &str,
        repository_id: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ArtifactGroup>, IndexingError>;
}

/// Fetches fixed-size pages of groups for one repository at a time.
pub struct GroupPageFetcher {
    source: Arc<dyn GroupSource>,
    page_size: usize,
}

impl GroupPageFetcher {
    pub fn new(source: Arc<dyn GroupSource>, page_size: usize) -> Self {
        Self { source, page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total groups in the repository.
    pub fn count(&self, repository: &RepositoryIdentity) -> Result<u64, IndexingError> {
        self.source
            .count(&repository.storage_id, &repository.repository_id)
    }

    /// Pages needed to cover `total` groups. Zero groups need zero pages and
    /// an exact multiple of the page size needs no trailing empty page.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size as u64)
    }

    /// Offset of page `page`.
    pub fn offset(&self, page: u64) -> u64 {
        page * self.page_size as u64
    }

    /// Fetch page number `page` (zero-based).
    pub fn fetch_page(
        &self,
        repository: &RepositoryIdentity,
        page: u64,
    ) -> Result<Vec<ArtifactGroup>, IndexingError> {
        let offset = self.offset(page);
        let groups = self.source.fetch_groups(
            &repository.storage_id,
            &repository.repository_id,
            offset,
            self.page_size,
        )?;
        debug!(
            repository = %repository,
            page,
            offset,
            returned = groups.len(),
            "Fetched group page"
        );
        Ok(groups)
    }
}
