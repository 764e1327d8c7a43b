//! # artifact-types
//!
//! Shared domain types for the artifact index.
//!
//! This crate defines the data structures that flow between the metadata
//! store, the rebuild pipeline and the search index:
//! - Coordinates: the semantic identity of one artifact file
//! - Records and groups: artifacts as the metadata store hands them out
//! - Index entries: a record plus its companion-existence flags
//! - Repository identities: which repository (and index location) is rebuilt
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use artifact_types::{ArtifactCoordinate, ArtifactRecord};
//!
//! let coordinate = ArtifactCoordinate::new("org.example", "lib", "1.0", None, "jar");
//! let record = ArtifactRecord::new("org/example/lib/1.0/lib-1.0.jar", coordinate);
//! assert_eq!(record.file_name(), "lib-1.0.jar");
//! ```

pub mod artifact;
pub mod config;
pub mod coordinate;
pub mod entry;
pub mod error;
pub mod repository;

pub use artifact::{ArtifactGroup, ArtifactRecord};
pub use config::Settings;
pub use coordinate::ArtifactCoordinate;
pub use entry::{CompanionFlags, IndexEntry};
pub use error::ArtifactError;
pub use repository::RepositoryIdentity;
