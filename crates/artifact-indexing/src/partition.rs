//! Splits an artifact-id group into per-version buckets.

use std::collections::HashMap;

use artifact_types::{ArtifactGroup, ArtifactRecord};

/// Records of one group that share a version, in group order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBucket<'a> {
    pub version: &'a str,
    pub records: Vec<&'a ArtifactRecord>,
}

/// Partition a group's records by coordinate version.
///
/// Buckets come out in first-seen order and records keep their group order.
/// Every record lands in exactly one bucket.
pub fn partition_by_version(group: &ArtifactGroup) -> Vec<VersionBucket<'_>> {
    let mut buckets: Vec<VersionBucket<'_>> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in &group.artifacts {
        let version = record.version();
        let position = *positions.entry(version).or_insert_with(|| {
            buckets.push(VersionBucket {
                version,
                records: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[position].records.push(record);
    }

    buckets
}
