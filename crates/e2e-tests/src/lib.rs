//! End-to-end test infrastructure for the artifact index.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the full store-to-index rebuild pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use artifact_indexing::{
    RebuildConfig, RebuildOrchestrator, StorageGroupSource, TantivyIndexWriter,
};
use artifact_search::{ArtifactIndex, ArtifactIndexConfig};
use artifact_storage::Storage;
use artifact_types::{ArtifactCoordinate, ArtifactGroup, ArtifactRecord, RepositoryIdentity};

/// Shared test harness for E2E tests.
///
/// Provides RocksDB storage and an index root in a temp directory.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared storage instance
    pub storage: Arc<Storage>,
    /// Root under which per-repository indexes are written
    pub index_root: PathBuf,
}

impl TestHarness {
    /// Create a new test harness with temp directory and storage.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage = Arc::new(
            Storage::open(&temp_dir.path().join("db")).expect("Failed to open test storage"),
        );
        let index_root = temp_dir.path().join("index");

        Self {
            _temp_dir: temp_dir,
            storage,
            index_root,
        }
    }

    /// Identity whose index lives under the harness index root.
    pub fn identity(&self, storage_id: &str, repository_id: &str) -> RepositoryIdentity {
        RepositoryIdentity::under_root(&self.index_root, storage_id, repository_id)
    }

    /// Orchestrator over the harness storage and a fresh Tantivy writer.
    pub fn orchestrator(&self, page_size: usize) -> RebuildOrchestrator {
        let source = Arc::new(StorageGroupSource::new(self.storage.clone()));
        let writer = Arc::new(TantivyIndexWriter::default());
        RebuildOrchestrator::new(
            source,
            writer,
            RebuildConfig::default().with_page_size(page_size),
        )
        .expect("Invalid rebuild config")
    }

    /// Open the index written for `identity`.
    pub fn open_index(&self, identity: &RepositoryIdentity) -> ArtifactIndex {
        ArtifactIndex::open_or_create(ArtifactIndexConfig::new(&identity.index_location))
            .expect("Failed to open index")
    }

    /// Insert groups, panicking on any store error.
    pub fn insert_groups(&self, groups: &[ArtifactGroup]) {
        for group in groups {
            self.storage
                .insert_group(group)
                .expect("Failed to insert group");
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Record for a Maven path, panicking if the path is not a Maven artifact path.
pub fn record(path: &str) -> ArtifactRecord {
    let coordinate = ArtifactCoordinate::parse_path(path).expect("Invalid artifact path");
    ArtifactRecord::new(path, coordinate)
}

/// A fully released version of `artifact_id`: jar, pom, sources, javadoc and
/// checksums.
///
/// Four of the six records are indexable.
pub fn released_group(
    storage_id: &str,
    repository_id: &str,
    artifact_id: &str,
    version: &str,
) -> ArtifactGroup {
    let mut group =
        ArtifactGroup::new(storage_id, repository_id, format!("org.example:{}", artifact_id));
    push_release(&mut group, artifact_id, version);
    group
}

/// Append the six records of one released version to `group`.
pub fn push_release(group: &mut ArtifactGroup, artifact_id: &str, version: &str) {
    let base = format!("org/example/{a}/{v}/{a}-{v}", a = artifact_id, v = version);
    for suffix in [
        ".jar",
        ".jar.sha1",
        ".pom",
        ".pom.md5",
        "-sources.jar",
        "-javadoc.jar",
    ] {
        group.push(record(&format!("{}{}", base, suffix)));
    }
}

/// `count` single-jar groups named `org.example:lib-0000`, `org.example:lib-0001`, ...
pub fn jar_groups(storage_id: &str, repository_id: &str, count: usize) -> Vec<ArtifactGroup> {
    (0..count)
        .map(|i| {
            let artifact_id = format!("lib-{:04}", i);
            let path = format!("org/example/{a}/1.0/{a}-1.0.jar", a = artifact_id);
            ArtifactGroup::new(storage_id, repository_id, format!("org.example:{}", artifact_id))
                .with_artifact(record(&path))
        })
        .collect()
}
