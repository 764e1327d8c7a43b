//! Metadata store for the artifact index.
//!
//! Provides RocksDB-backed storage of artifact-id groups with:
//! - One column family for groups, keyed by (storage, repository, name)
//! - Uniqueness of (storage, repository, name) enforced on insert
//! - Deterministic, offset-based pagination in key order
//! - Admin operations (stats, compaction)

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use keys::GroupKey;
