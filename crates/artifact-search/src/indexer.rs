//! Artifact indexer: purge, batch add and pack over one Tantivy index.
//!
//! The indexer wraps IndexWriter with shared access via Arc<Mutex>.
//! Each non-empty batch is committed on its own so entries already added stay
//! visible if a later batch fails.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tantivy::{IndexWriter, Term};
use tracing::{debug, info, warn};

use artifact_types::IndexEntry;

use crate::document::entry_to_doc;
use crate::error::SearchError;
use crate::index::{ArtifactIndex, ArtifactIndexConfig};

/// File written next to the index segments when the index is packed.
pub const PACK_METADATA_FILE: &str = "artifact-index.json";

/// Written by [`ArtifactIndexer::pack`]; its presence marks a sealed index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackMetadata {
    /// `storage:repository` label
    pub repository: String,
    pub document_count: u64,
    pub segment_count: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub packed_at: DateTime<Utc>,
}

impl PackMetadata {
    fn path(index_path: &Path) -> PathBuf {
        index_path.join(PACK_METADATA_FILE)
    }

    /// Load pack metadata, `None` when the index has not been packed since
    /// its last purge.
    pub fn load(index_path: &Path) -> Result<Option<Self>, SearchError> {
        let path = Self::path(index_path);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Writes artifact documents into one index directory.
pub struct ArtifactIndexer {
    index: ArtifactIndex,
    writer: Arc<Mutex<IndexWriter>>,
}

impl ArtifactIndexer {
    /// Open (or create) the index described by `config` and take its writer.
    pub fn open(config: ArtifactIndexConfig) -> Result<Self, SearchError> {
        let index = ArtifactIndex::open_or_create(config)?;
        Self::new(index)
    }

    /// Create an indexer from an opened index.
    pub fn new(index: ArtifactIndex) -> Result<Self, SearchError> {
        let writer = index.writer()?;
        Ok(Self {
            index,
            writer: Arc::new(Mutex::new(writer)),
        })
    }

    /// The index this indexer writes to.
    pub fn index(&self) -> &ArtifactIndex {
        &self.index
    }

    fn lock_writer(&self) -> Result<std::sync::MutexGuard<'_, IndexWriter>, SearchError> {
        self.writer
            .lock()
            .map_err(|e| SearchError::IndexLocked(e.to_string()))
    }

    /// Delete every document and commit, leaving an empty index.
    pub fn purge(&self) -> Result<u64, SearchError> {
        let mut writer = self.lock_writer()?;
        writer.delete_all_documents()?;
        let opstamp = writer.commit()?;

        let metadata_path = PackMetadata::path(self.index.path());
        if metadata_path.exists() {
            std::fs::remove_file(&metadata_path)?;
        }

        info!(path = ?self.index.path(), opstamp, "Purged artifact index");
        Ok(opstamp)
    }

    /// Add a batch of entries and commit it.
    ///
    /// An existing document with the same `uinfo` is replaced, so the returned
    /// count is the number of distinct `uinfo`s in the batch. An empty batch is
    /// a no-op and does not commit.
    pub fn add_entries(&self, entries: &[IndexEntry], repository: &str) -> Result<usize, SearchError> {
        if entries.is_empty() {
            debug!(repository, "Empty batch, nothing to add");
            return Ok(0);
        }

        let schema = self.index.schema();
        let mut writer = self.lock_writer()?;
        let mut stored = HashSet::with_capacity(entries.len());

        for entry in entries {
            let uinfo = entry.record.coordinate.uinfo();
            writer.delete_term(Term::from_field_text(schema.uinfo, &uinfo));
            writer.add_document(entry_to_doc(schema, entry, repository))?;
            stored.insert(uinfo);
        }
        let opstamp = writer.commit()?;

        debug!(
            repository,
            count = entries.len(),
            stored = stored.len(),
            opstamp,
            "Indexed artifact batch"
        );
        Ok(stored.len())
    }

    /// Seal the index: commit, merge all segments into one, collect garbage
    /// and write [`PackMetadata`].
    pub fn pack(&self, repository: &str) -> Result<PackMetadata, SearchError> {
        let mut writer = self.lock_writer()?;
        writer.commit()?;

        let segment_ids = self.index.index().searchable_segment_ids()?;
        if segment_ids.len() > 1 {
            debug!(segments = segment_ids.len(), "Merging segments");
            writer.merge(&segment_ids).wait()?;
        }
        if let Err(e) = writer.garbage_collect_files().wait() {
            warn!(error = %e, "Failed to garbage collect index files");
        }
        drop(writer);

        let metadata = PackMetadata {
            repository: repository.to_string(),
            document_count: self.index.num_docs()?,
            segment_count: self.index.index().searchable_segment_ids()?.len(),
            packed_at: Utc::now(),
        };
        std::fs::write(
            PackMetadata::path(self.index.path()),
            serde_json::to_vec_pretty(&metadata)?,
        )?;

        info!(
            repository,
            documents = metadata.document_count,
            segments = metadata.segment_count,
            "Packed artifact index"
        );
        Ok(metadata)
    }
}
