//! Index rebuild pipeline for Maven artifact repositories.
//!
//! Reconstructs a repository's search index from the artifact-id groups held
//! in the metadata store.
//!
//! ## Key Components
//!
//! - [`is_indexable`]: Excludes metadata, checksum and signature files
//! - [`partition_by_version`]: Buckets a group's records by version
//! - [`classify`]: Computes companion flags against same-version siblings
//! - [`GroupPageFetcher`]: Pages through a [`GroupSource`]
//! - [`build`] / [`build_page`]: Turn groups into [`IndexEntry`] batches
//! - [`RebuildOrchestrator`]: Purge, page, submit, pack
//! - [`RepositoryLeases`]: One in-flight rebuild per repository
//!
//! ## Architecture
//!
//! Data flows one way:
//! 1. The orchestrator purges the index through an [`IndexWriter`]
//! 2. [`GroupPageFetcher`] pulls pages of groups from the store
//! 3. Each group is partitioned by version, filtered and classified
//! 4. The page's entries are submitted as one batch, in page order
//! 5. The index is packed once every page succeeded
//!
//! [`StorageGroupSource`] and [`TantivyIndexWriter`] connect the pipeline to
//! RocksDB storage and the Tantivy index.
//!
//! ## Example
//!
//! ```ignore
//! use artifact_indexing::{RebuildConfig, RebuildOrchestrator, StorageGroupSource, TantivyIndexWriter};
//!
//! let source = Arc::new(StorageGroupSource::new(storage));
//! let writer = Arc::new(TantivyIndexWriter::default());
//! let orchestrator = RebuildOrchestrator::new(source, writer, RebuildConfig::default())?;
//!
//! let report = orchestrator.rebuild(&identity)?;
//! println!("{} entries", report.entries_submitted);
//! ```
//!
//! [`IndexEntry`]: artifact_types::IndexEntry

pub mod builder;
pub mod classifier;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod lease;
pub mod partition;
pub mod rebuild;
pub mod store_source;
pub mod tantivy_writer;
pub mod writer;

pub use builder::{build, build_page, PageBatch};
pub use classifier::classify;
pub use error::{IndexingError, RebuildError, RebuildStage};
pub use fetcher::{GroupPageFetcher, GroupSource};
pub use filter::{is_indexable, is_indexable_file_name};
pub use lease::{RepositoryLease, RepositoryLeases};
pub use partition::{partition_by_version, VersionBucket};
pub use rebuild::{
    LoggingProgressCallback, NoOpProgressCallback, ProgressCallback, RebuildConfig,
    RebuildOrchestrator, RebuildProgress, RebuildReport, RebuildState, DEFAULT_PAGE_SIZE,
};
pub use store_source::StorageGroupSource;
pub use tantivy_writer::TantivyIndexWriter;
pub use writer::{IndexWriter, IndexingContext};
