//! # artifact-search
//!
//! Tantivy-backed search index for repository artifacts.
//!
//! The rebuild pipeline talks to this crate through three operations:
//! purge the index, add a batch of entries, and pack the index once
//! population is complete.
//!
//! ## Features
//! - Embedded Tantivy index with MmapDirectory for persistence
//! - One document per indexable artifact, keyed by its `uinfo` string
//! - Companion flags stored as numeric fields
//! - Pack merges all segments into one and writes pack metadata

pub mod document;
pub mod error;
pub mod index;
pub mod indexer;
pub mod schema;

pub use document::{entry_to_doc, IndexedArtifact};
pub use error::SearchError;
pub use index::{open_or_create_index, ArtifactIndex, ArtifactIndexConfig};
pub use indexer::{ArtifactIndexer, PackMetadata, PACK_METADATA_FILE};
pub use schema::{build_artifact_schema, ArtifactSchema};
