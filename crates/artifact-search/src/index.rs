//! Tantivy index management.
//!
//! Handles index creation, opening, and read access.

use std::path::{Path, PathBuf};

use tantivy::collector::TopDocs;
use tantivy::indexer::NoMergePolicy;
use tantivy::query::TermQuery;
use tantivy::schema::IndexRecordOption;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use crate::document::IndexedArtifact;
use crate::error::SearchError;
use crate::schema::{build_artifact_schema, ArtifactSchema};

/// Default memory budget for IndexWriter (50MB)
const DEFAULT_WRITER_MEMORY_MB: usize = 50;

/// Artifact index configuration
#[derive(Debug, Clone)]
pub struct ArtifactIndexConfig {
    /// Path to index directory
    pub index_path: PathBuf,
    /// Memory budget for writer in MB
    pub writer_memory_mb: usize,
}

impl Default for ArtifactIndexConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./artifact-index"),
            writer_memory_mb: DEFAULT_WRITER_MEMORY_MB,
        }
    }
}

impl ArtifactIndexConfig {
    pub fn new(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            writer_memory_mb: DEFAULT_WRITER_MEMORY_MB,
        }
    }

    pub fn with_memory_mb(mut self, mb: usize) -> Self {
        self.writer_memory_mb = mb;
        self
    }
}

/// Wrapper for a Tantivy index with schema access.
pub struct ArtifactIndex {
    index: Index,
    schema: ArtifactSchema,
    config: ArtifactIndexConfig,
}

impl ArtifactIndex {
    /// Open existing index or create new one.
    pub fn open_or_create(config: ArtifactIndexConfig) -> Result<Self, SearchError> {
        let index = open_or_create_index(&config.index_path)?;
        let schema = ArtifactSchema::from_schema(index.schema())?;

        info!(path = ?config.index_path, "Opened artifact index");

        Ok(Self {
            index,
            schema,
            config,
        })
    }

    /// Get the artifact schema
    pub fn schema(&self) -> &ArtifactSchema {
        &self.schema
    }

    /// Get the underlying Tantivy index
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Create an IndexWriter with configured memory budget.
    ///
    /// Background merging is disabled; segments are merged when the index is
    /// packed.
    pub fn writer(&self) -> Result<IndexWriter, SearchError> {
        let memory_budget = self.config.writer_memory_mb * 1024 * 1024;
        let writer = self.index.writer(memory_budget)?;
        writer.set_merge_policy(Box::new(NoMergePolicy));
        debug!(
            memory_mb = self.config.writer_memory_mb,
            "Created index writer"
        );
        Ok(writer)
    }

    /// Create an IndexReader. Readers only see committed documents.
    pub fn reader(&self) -> Result<IndexReader, SearchError> {
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(reader)
    }

    /// Number of committed documents.
    pub fn num_docs(&self) -> Result<u64, SearchError> {
        let reader = self.reader()?;
        Ok(reader.searcher().num_docs())
    }

    /// Find a committed artifact by its `uinfo` key.
    pub fn lookup(&self, uinfo: &str) -> Result<Option<IndexedArtifact>, SearchError> {
        let reader = self.reader()?;
        let searcher = reader.searcher();

        let query = TermQuery::new(
            Term::from_field_text(self.schema.uinfo, uinfo),
            IndexRecordOption::Basic,
        );
        let top_docs = searcher.search(&query, &TopDocs::with_limit(1))?;

        match top_docs.into_iter().next() {
            Some((_, address)) => {
                let doc: TantivyDocument = searcher.doc(address)?;
                Ok(Some(IndexedArtifact::from_doc(&self.schema, &doc)))
            }
            None => Ok(None),
        }
    }

    /// Get the index path
    pub fn path(&self) -> &Path {
        &self.config.index_path
    }

    /// Check if index exists at the configured path
    pub fn exists(&self) -> bool {
        self.config.index_path.join("meta.json").exists()
    }
}

/// Open an existing index or create a new one.
///
/// Uses MmapDirectory for persistence.
pub fn open_or_create_index(path: &Path) -> Result<Index, SearchError> {
    if path.join("meta.json").exists() {
        debug!(path = ?path, "Opening existing index");
        let index = Index::open_in_dir(path)?;
        Ok(index)
    } else {
        info!(path = ?path, "Creating new index");
        std::fs::create_dir_all(path)?;
        let schema = build_artifact_schema();
        let index = Index::create_in_dir(path, schema.schema().clone())?;
        Ok(index)
    }
}
