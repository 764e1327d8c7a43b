//! Key encoding and decoding for the group column family.
//!
//! Key format: `grp:{storage_id}:{repository_id}:{name}`
//! - storage_id and repository_id must not contain `:`
//! - name is the remainder of the key and may contain anything
//!
//! All groups of one repository therefore share the prefix
//! `grp:{storage_id}:{repository_id}:` and sort by name.

use crate::error::StorageError;

const GROUP_PREFIX: &str = "grp";

/// Key for an artifact-id group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupKey {
    pub storage_id: String,
    pub repository_id: String,
    pub name: String,
}

impl GroupKey {
    pub fn new(
        storage_id: impl Into<String>,
        repository_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let key = Self {
            storage_id: storage_id.into(),
            repository_id: repository_id.into(),
            name: name.into(),
        };
        validate_segment("storage_id", &key.storage_id)?;
        validate_segment("repository_id", &key.repository_id)?;
        if key.name.is_empty() {
            return Err(StorageError::Key("group name must not be empty".to_string()));
        }
        Ok(key)
    }

    /// Encode key to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{}:{}:{}:{}",
            GROUP_PREFIX, self.storage_id, self.repository_id, self.name
        )
        .into_bytes()
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

        let parts: Vec<&str> = s.splitn(4, ':').collect();
        if parts.len() != 4 || parts[0] != GROUP_PREFIX {
            return Err(StorageError::Key(format!("Invalid group key format: {}", s)));
        }

        Self::new(parts[1], parts[2], parts[3])
    }

    /// Prefix shared by every group of one repository
    pub fn repository_prefix(storage_id: &str, repository_id: &str) -> Result<Vec<u8>, StorageError> {
        validate_segment("storage_id", storage_id)?;
        validate_segment("repository_id", repository_id)?;
        Ok(format!("{}:{}:{}:", GROUP_PREFIX, storage_id, repository_id).into_bytes())
    }
}

fn validate_segment(field: &str, value: &str) -> Result<(), StorageError> {
    if value.is_empty() {
        return Err(StorageError::Key(format!("{} must not be empty", field)));
    }
    if value.contains(':') {
        return Err(StorageError::Key(format!(
            "{} must not contain ':': {}",
            field, value
        )));
    }
    Ok(())
}
