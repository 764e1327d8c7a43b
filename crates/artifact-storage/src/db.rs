//! RocksDB wrapper for the artifact metadata store.
//!
//! Provides:
//! - Database open with column family setup
//! - Unique inserts of artifact-id groups
//! - Counting and offset/limit pagination per repository
//! - Admin operations (stats, compaction)

use std::path::Path;
use std::sync::Mutex;

use rocksdb::{Direction, IteratorMode, Options, DB};
use tracing::{debug, info};

use artifact_types::ArtifactGroup;

use crate::column_families::{build_cf_descriptors, CF_ARTIFACT_GROUPS};
use crate::error::StorageError;
use crate::keys::GroupKey;

/// Main storage interface for artifact metadata
pub struct Storage {
    db: DB,
    /// Serializes the exists-check and put of `insert_group`
    write_lock: Mutex<()>,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(4);

        let db = DB::open_cf_descriptors(&db_opts, path, build_cf_descriptors())?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn groups_cf(&self) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_ARTIFACT_GROUPS)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_ARTIFACT_GROUPS.to_string()))
    }

    /// Insert a new group.
    ///
    /// Fails with [`StorageError::ConstraintViolation`] when a group with the
    /// same (storage, repository, name) already exists.
    pub fn insert_group(&self, group: &ArtifactGroup) -> Result<(), StorageError> {
        let key = GroupKey::new(&group.storage_id, &group.repository_id, &group.name)?;
        let cf = self.groups_cf()?;
        let value = group.to_bytes()?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        if self.db.get_cf(cf, key.to_bytes())?.is_some() {
            return Err(StorageError::ConstraintViolation {
                storage_id: key.storage_id,
                repository_id: key.repository_id,
                name: key.name,
            });
        }

        self.db.put_cf(cf, key.to_bytes(), value)?;
        debug!(
            storage_id = %group.storage_id,
            repository_id = %group.repository_id,
            name = %group.name,
            artifacts = group.len(),
            "Stored artifact group"
        );
        Ok(())
    }

    /// Get a group by its identifying triple
    pub fn get_group(
        &self,
        storage_id: &str,
        repository_id: &str,
        name: &str,
    ) -> Result<Option<ArtifactGroup>, StorageError> {
        let key = GroupKey::new(storage_id, repository_id, name)?;
        let cf = self.groups_cf()?;
        match self.db.get_cf(cf, key.to_bytes())? {
            Some(bytes) => Ok(Some(ArtifactGroup::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Delete a group, returning whether it existed
    pub fn delete_group(
        &self,
        storage_id: &str,
        repository_id: &str,
        name: &str,
    ) -> Result<bool, StorageError> {
        let key = GroupKey::new(storage_id, repository_id, name)?;
        let cf = self.groups_cf()?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        if self.db.get_cf(cf, key.to_bytes())?.is_none() {
            return Ok(false);
        }
        self.db.delete_cf(cf, key.to_bytes())?;
        debug!(storage_id, repository_id, name, "Deleted artifact group");
        Ok(true)
    }

    /// Number of groups in one repository
    pub fn count_groups(&self, storage_id: &str, repository_id: &str) -> Result<u64, StorageError> {
        let prefix = GroupKey::repository_prefix(storage_id, repository_id)?;
        let cf = self.groups_cf()?;

        let mut count = 0u64;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    /// Groups of one repository in key (name) order, skipping `offset` and
    /// returning at most `limit`.
    ///
    /// An offset past the end yields an empty page.
    ///
    /// Each call walks the repository prefix from its first key and counts
    /// past `offset` keys, so paging through N groups reads O(N^2 / limit)
    /// keys in total. Skipped values are not deserialized.
    pub fn list_groups(
        &self,
        storage_id: &str,
        repository_id: &str,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ArtifactGroup>, StorageError> {
        let prefix = GroupKey::repository_prefix(storage_id, repository_id)?;
        let cf = self.groups_cf()?;

        let mut groups = Vec::with_capacity(limit);
        let mut position = 0u64;
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix, Direction::Forward));

        for item in iter {
            if groups.len() >= limit {
                break;
            }
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            if position >= offset {
                groups.push(ArtifactGroup::from_bytes(&value)?);
            }
            position += 1;
        }

        debug!(
            storage_id,
            repository_id,
            offset,
            limit,
            returned = groups.len(),
            "Listed artifact groups"
        );
        Ok(groups)
    }

    /// Every (storage_id, repository_id) pair that owns at least one group.
    pub fn list_repositories(&self) -> Result<Vec<(String, String)>, StorageError> {
        let cf = self.groups_cf()?;
        let mut repositories: Vec<(String, String)> = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item?;
            let key = GroupKey::from_bytes(&key)?;
            let pair = (key.storage_id, key.repository_id);
            // Keys sort by repository first, so duplicates are adjacent.
            if repositories.last() != Some(&pair) {
                repositories.push(pair);
            }
        }
        Ok(repositories)
    }

    /// Flush memtables to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        let cf = self.groups_cf()?;
        self.db.flush_cf(cf)?;
        Ok(())
    }

    // ===== Admin Operations =====

    /// Trigger manual compaction of the group column family.
    pub fn compact(&self) -> Result<(), StorageError> {
        info!("Starting full compaction...");
        let cf = self.groups_cf()?;
        self.db.compact_range_cf::<&[u8], &[u8]>(cf, None, None);
        info!("Compaction complete");
        Ok(())
    }

    /// Get database statistics.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let mut stats = StorageStats::default();
        let cf = self.groups_cf()?;

        let mut last_repository: Option<(String, String)> = None;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let key = GroupKey::from_bytes(&key)?;
            let group = ArtifactGroup::from_bytes(&value)?;

            stats.group_count += 1;
            stats.artifact_count += group.len() as u64;

            let pair = (key.storage_id, key.repository_id);
            if last_repository.as_ref() != Some(&pair) {
                stats.repository_count += 1;
                last_repository = Some(pair);
            }
        }

        stats.disk_usage_bytes = self.get_disk_usage();
        Ok(stats)
    }

    fn get_disk_usage(&self) -> u64 {
        let mut total_size = 0u64;
        if let Ok(entries) = std::fs::read_dir(self.db.path()) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    total_size += metadata.len();
                }
            }
        }
        total_size
    }
}

/// Statistics about the storage.
#[derive(Debug, Default)]
pub struct StorageStats {
    /// Number of distinct (storage, repository) pairs
    pub repository_count: u64,
    /// Number of artifact-id groups
    pub group_count: u64,
    /// Number of artifact records across all groups
    pub artifact_count: u64,
    /// Total disk usage in bytes
    pub disk_usage_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_families::ALL_CF_NAMES;
    use artifact_types::{ArtifactCoordinate, ArtifactRecord};
    use tempfile::TempDir;

    fn create_test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn group(storage_id: &str, repository_id: &str, name: &str) -> ArtifactGroup {
        let path = format!("org/example/{name}/1.0/{name}-1.0.jar");
        let coordinate = ArtifactCoordinate::parse_path(&path).unwrap();
        ArtifactGroup::new(storage_id, repository_id, name)
            .with_artifact(ArtifactRecord::new(path, coordinate))
    }

    #[test]
    fn test_open_creates_column_families() {
        let (storage, _temp) = create_test_storage();
        for cf_name in ALL_CF_NAMES {
            assert!(
                storage.db.cf_handle(cf_name).is_some(),
                "CF {} should exist",
                cf_name
            );
        }
    }

    #[test]
    fn test_insert_and_get_group() {
        let (storage, _temp) = create_test_storage();
        let g = group("s1", "r1", "a1");
        storage.insert_group(&g).unwrap();

        let loaded = storage.get_group("s1", "r1", "a1").unwrap().unwrap();
        assert_eq!(loaded, g);
        assert!(storage.get_group("s1", "r1", "missing").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_is_constraint_violation() {
        let (storage, _temp) = create_test_storage();
        storage.insert_group(&group("s1", "r1", "a1")).unwrap();

        let err = storage.insert_group(&group("s1", "r1", "a1")).unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation { .. }));

        // Same name in another repository or storage is fine.
        storage.insert_group(&group("s1", "r2", "a1")).unwrap();
        storage.insert_group(&group("s2", "r1", "a1")).unwrap();
    }

    #[test]
    fn test_count_is_scoped_to_repository() {
        let (storage, _temp) = create_test_storage();
        for i in 0..5 {
            storage.insert_group(&group("s", "r", &format!("a{i}"))).unwrap();
        }
        storage.insert_group(&group("s", "r2", "a0")).unwrap();

        assert_eq!(storage.count_groups("s", "r").unwrap(), 5);
        assert_eq!(storage.count_groups("s", "r2").unwrap(), 1);
        assert_eq!(storage.count_groups("s", "none").unwrap(), 0);
    }

    #[test]
    fn test_list_groups_pages_in_name_order() {
        let (storage, _temp) = create_test_storage();
        for name in ["delta", "alpha", "echo", "charlie", "bravo"] {
            storage.insert_group(&group("s", "r", name)).unwrap();
        }

        let first = storage.list_groups("s", "r", 0, 2).unwrap();
        let second = storage.list_groups("s", "r", 2, 2).unwrap();
        let third = storage.list_groups("s", "r", 4, 2).unwrap();
        let past_end = storage.list_groups("s", "r", 10, 2).unwrap();

        let names = |page: &[ArtifactGroup]| page.iter().map(|g| g.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&first), vec!["alpha", "bravo"]);
        assert_eq!(names(&second), vec!["charlie", "delta"]);
        assert_eq!(names(&third), vec!["echo"]);
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_list_groups_offset_stays_within_repository() {
        let (storage, _temp) = create_test_storage();
        storage.insert_group(&group("s", "r", "a")).unwrap();
        storage.insert_group(&group("s", "r", "b")).unwrap();
        storage.insert_group(&group("s", "r2", "c")).unwrap();

        let page = storage.list_groups("s", "r", 1, 10).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "b");
        assert!(storage.list_groups("s", "r", 2, 10).unwrap().is_empty());
    }

    #[test]
    fn test_delete_group() {
        let (storage, _temp) = create_test_storage();
        storage.insert_group(&group("s", "r", "a")).unwrap();
        assert!(storage.delete_group("s", "r", "a").unwrap());
        assert!(!storage.delete_group("s", "r", "a").unwrap());
        // Re-insert is allowed once the original is gone.
        storage.insert_group(&group("s", "r", "a")).unwrap();
    }

    #[test]
    fn test_list_repositories() {
        let (storage, _temp) = create_test_storage();
        storage.insert_group(&group("s1", "releases", "a")).unwrap();
        storage.insert_group(&group("s1", "releases", "b")).unwrap();
        storage.insert_group(&group("s1", "snapshots", "a")).unwrap();
        storage.insert_group(&group("s2", "releases", "a")).unwrap();

        let repositories = storage.list_repositories().unwrap();
        assert_eq!(
            repositories,
            vec![
                ("s1".to_string(), "releases".to_string()),
                ("s1".to_string(), "snapshots".to_string()),
                ("s2".to_string(), "releases".to_string()),
            ]
        );
    }

    #[test]
    fn test_stats() {
        let (storage, _temp) = create_test_storage();
        storage.insert_group(&group("s", "r", "a")).unwrap();
        storage.insert_group(&group("s", "r", "b")).unwrap();
        storage.insert_group(&group("s", "r2", "a")).unwrap();

        let stats = storage.get_stats().unwrap();
        assert_eq!(stats.repository_count, 2);
        assert_eq!(stats.group_count, 3);
        assert_eq!(stats.artifact_count, 3);
    }
}
