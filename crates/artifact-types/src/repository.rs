//! Repository identity used to key rebuilds and index locations.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A repository inside a storage, plus where its index lives.
///
/// Equality and hashing only consider `(storage_id, repository_id)`, so two
/// identities that point at different index directories still name the same
/// repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub storage_id: String,
    pub repository_id: String,
    /// Directory holding this repository's search index
    pub index_location: PathBuf,
}

impl RepositoryIdentity {
    pub fn new(
        storage_id: impl Into<String>,
        repository_id: impl Into<String>,
        index_location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage_id: storage_id.into(),
            repository_id: repository_id.into(),
            index_location: index_location.into(),
        }
    }

    /// Identity with the conventional index location
    /// `{index_root}/{storage_id}/{repository_id}`.
    pub fn under_root(
        index_root: &Path,
        storage_id: impl Into<String>,
        repository_id: impl Into<String>,
    ) -> Self {
        let storage_id = storage_id.into();
        let repository_id = repository_id.into();
        let index_location = index_root.join(&storage_id).join(&repository_id);
        Self {
            storage_id,
            repository_id,
            index_location,
        }
    }

    /// Lease key: `(storage_id, repository_id)`.
    pub fn key(&self) -> (String, String) {
        (self.storage_id.clone(), self.repository_id.clone())
    }
}

impl PartialEq for RepositoryIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.storage_id == other.storage_id && self.repository_id == other.repository_id
    }
}

impl Eq for RepositoryIdentity {}

impl std::hash::Hash for RepositoryIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.storage_id.hash(state);
        self.repository_id.hash(state);
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.storage_id, self.repository_id)
    }
}
