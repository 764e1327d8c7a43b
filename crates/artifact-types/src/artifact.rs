//! Artifact records and artifact-id groups.
//!
//! Groups are owned by the metadata store. Everything downstream of the store
//! only borrows them.

use serde::{Deserialize, Serialize};

use crate::coordinate::ArtifactCoordinate;

/// One physical artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Path relative to the repository root
    pub path: String,

    /// Semantic identity of the file
    pub coordinate: ArtifactCoordinate,
}

impl ArtifactRecord {
    pub fn new(path: impl Into<String>, coordinate: ArtifactCoordinate) -> Self {
        Self {
            path: path.into(),
            coordinate,
        }
    }

    /// Final segment of the storage path.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Release version of the underlying coordinate.
    pub fn version(&self) -> &str {
        &self.coordinate.version
    }
}

/// All records that share one artifact id inside a (storage, repository).
///
/// `(storage_id, repository_id, name)` is unique; the metadata store enforces
/// it on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactGroup {
    pub storage_id: String,
    pub repository_id: String,
    /// Name of the artifact-id group, `groupId:artifactId` for imported groups
    pub name: String,
    /// Records in store insertion order
    #[serde(default)]
    pub artifacts: Vec<ArtifactRecord>,
}

impl ArtifactGroup {
    pub fn new(
        storage_id: impl Into<String>,
        repository_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            storage_id: storage_id.into(),
            repository_id: repository_id.into(),
            name: name.into(),
            artifacts: Vec::new(),
        }
    }

    /// Append a record
    pub fn with_artifact(mut self, record: ArtifactRecord) -> Self {
        self.artifacts.push(record);
        self
    }

    pub fn push(&mut self, record: ArtifactRecord) {
        self.artifacts.push(record);
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
