//! Index writer backed by Tantivy.
//!
//! Wraps [`ArtifactIndexer`] from artifact-search. One indexer is kept open
//! per index location between purge and pack, or until a failed rebuild
//! releases it; Tantivy allows a single writer per index directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use artifact_search::{ArtifactIndexConfig, ArtifactIndexer};
use artifact_types::IndexEntry;

use crate::error::IndexingError;
use crate::writer::{IndexWriter, IndexingContext};

/// Default writer memory budget in MB.
const DEFAULT_WRITER_MEMORY_MB: usize = 50;

/// Tantivy-backed [`IndexWriter`] serving any number of index locations.
pub struct TantivyIndexWriter {
    writer_memory_mb: usize,
    indexers: DashMap<PathBuf, Arc<ArtifactIndexer>>,
}

impl Default for TantivyIndexWriter {
    fn default() -> Self {
        Self::new(DEFAULT_WRITER_MEMORY_MB)
    }
}

impl TantivyIndexWriter {
    pub fn new(writer_memory_mb: usize) -> Self {
        Self {
            writer_memory_mb,
            indexers: DashMap::new(),
        }
    }

    /// Open indexer for `location`, opening the index on first use.
    fn indexer(&self, location: &Path) -> Result<Arc<ArtifactIndexer>, IndexingError> {
        if let Some(indexer) = self.indexers.get(location) {
            return Ok(indexer.clone());
        }

        let config = ArtifactIndexConfig::new(location).with_memory_mb(self.writer_memory_mb);
        let indexer = Arc::new(ArtifactIndexer::open(config)?);
        let indexer = self
            .indexers
            .entry(location.to_path_buf())
            .or_insert(indexer)
            .clone();
        debug!(location = ?location, "Opened artifact indexer");
        Ok(indexer)
    }

    /// Number of index locations with an open writer.
    pub fn open_writers(&self) -> usize {
        self.indexers.len()
    }
}

impl IndexWriter for TantivyIndexWriter {
    fn purge(&self, location: &Path) -> Result<(), IndexingError> {
        self.indexer(location)?.purge()?;
        Ok(())
    }

    fn add_entries(
        &self,
        batch: &[IndexEntry],
        context: &IndexingContext,
    ) -> Result<usize, IndexingError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let indexer = self.indexer(context.index_location())?;
        Ok(indexer.add_entries(batch, &context.label())?)
    }

    fn pack(&self, location: &Path, context: &IndexingContext) -> Result<(), IndexingError> {
        let indexer = self.indexer(location)?;
        indexer.pack(&context.label())?;
        drop(indexer);

        // Release the Tantivy writer lock so readers and later rebuilds can
        // open the directory.
        self.indexers.remove(location);
        Ok(())
    }

    fn release(&self, location: &Path) {
        if self.indexers.remove(location).is_some() {
            debug!(location = ?location, "Released artifact indexer");
        }
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_search::{ArtifactIndex, PackMetadata};
    use artifact_types::{
        ArtifactCoordinate, ArtifactGroup, ArtifactRecord, CompanionFlags, RepositoryIdentity,
    };
    use tempfile::TempDir;

    use crate::error::RebuildStage;
    use crate::fetcher::GroupSource;
    use crate::rebuild::{RebuildConfig, RebuildOrchestrator};

    /// Source whose count succeeds and whose fetches always fail.
    struct BrokenFetchSource;

    impl GroupSource for BrokenFetchSource {
        fn count(&self, _storage_id: &str, _repository_id: &str) -> Result<u64, IndexingError> {
            Ok(10)
        }

        fn fetch_groups(
            &self,
            _storage_id: &str,
            _repository_id: &str,
            _offset: u64,
            _limit: usize,
        ) -> Result<Vec<ArtifactGroup>, IndexingError> {
            Err(IndexingError::StoreUnavailable("connection reset".into()))
        }
    }

    fn entry(artifact_id: &str) -> IndexEntry {
        let coordinate = ArtifactCoordinate::new("org.example", artifact_id, "1.0", None, "jar");
        IndexEntry::new(
            ArtifactRecord::new(coordinate.to_path(), coordinate),
            CompanionFlags::new(true, false, false),
        )
    }

    #[test]
    fn test_purge_add_pack() {
        let temp_dir = TempDir::new().unwrap();
        let identity = RepositoryIdentity::under_root(temp_dir.path(), "s", "r");
        let context = IndexingContext::new(identity.clone());
        let writer = TantivyIndexWriter::default();

        writer.purge(&identity.index_location).unwrap();
        assert_eq!(writer.add_entries(&[entry("a"), entry("b")], &context).unwrap(), 2);
        assert_eq!(writer.add_entries(&[], &context).unwrap(), 0);
        assert_eq!(writer.open_writers(), 1);

        writer.pack(&identity.index_location, &context).unwrap();
        assert_eq!(writer.open_writers(), 0);

        let metadata = PackMetadata::load(&identity.index_location).unwrap().unwrap();
        assert_eq!(metadata.repository, "s:r");
        assert_eq!(metadata.document_count, 2);

        let index =
            ArtifactIndex::open_or_create(ArtifactIndexConfig::new(&identity.index_location)).unwrap();
        let stored = index.lookup("org.example|a|1.0|NA|jar").unwrap().unwrap();
        assert!(stored.flags.descriptor_exists);
    }

    #[test]
    fn test_locations_are_independent() {
        let temp_dir = TempDir::new().unwrap();
        let writer = TantivyIndexWriter::default();
        let first = IndexingContext::new(RepositoryIdentity::under_root(temp_dir.path(), "s", "r1"));
        let second = IndexingContext::new(RepositoryIdentity::under_root(temp_dir.path(), "s", "r2"));

        writer.purge(first.index_location()).unwrap();
        writer.purge(second.index_location()).unwrap();
        writer.add_entries(&[entry("a")], &first).unwrap();
        writer.add_entries(&[entry("b"), entry("c")], &second).unwrap();
        assert_eq!(writer.open_writers(), 2);

        writer.pack(first.index_location(), &first).unwrap();
        writer.pack(second.index_location(), &second).unwrap();

        let docs = |ctx: &IndexingContext| {
            ArtifactIndex::open_or_create(ArtifactIndexConfig::new(ctx.index_location()))
                .unwrap()
                .num_docs()
                .unwrap()
        };
        assert_eq!(docs(&first), 1);
        assert_eq!(docs(&second), 2);
    }

    #[test]
    fn test_release_drops_open_writer() {
        let temp_dir = TempDir::new().unwrap();
        let identity = RepositoryIdentity::under_root(temp_dir.path(), "s", "r");
        let writer = TantivyIndexWriter::default();

        writer.purge(&identity.index_location).unwrap();
        assert_eq!(writer.open_writers(), 1);

        writer.release(&identity.index_location);
        assert_eq!(writer.open_writers(), 0);
        writer.release(&identity.index_location);

        ArtifactIndexer::open(ArtifactIndexConfig::new(&identity.index_location)).unwrap();
    }

    #[test]
    fn test_failed_rebuild_releases_writer() {
        let temp_dir = TempDir::new().unwrap();
        let identity = RepositoryIdentity::under_root(temp_dir.path(), "s", "r");
        let writer = Arc::new(TantivyIndexWriter::default());
        let orchestrator = RebuildOrchestrator::new(
            Arc::new(BrokenFetchSource),
            writer.clone(),
            RebuildConfig::default(),
        )
        .unwrap();

        let err = orchestrator.rebuild(&identity).unwrap_err();
        assert_eq!(err.stage(), Some(RebuildStage::Paging));
        assert_eq!(writer.open_writers(), 0);

        // The directory lock is free for a new writer.
        ArtifactIndexer::open(ArtifactIndexConfig::new(&identity.index_location)).unwrap();
        writer.purge(&identity.index_location).unwrap();
    }
}
