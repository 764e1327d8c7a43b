//! Index entry construction.
//!
//! Combines the version partitioner, the inclusion filter and the companion
//! classifier into the flat list of entries submitted for one page.

use artifact_types::{ArtifactGroup, IndexEntry};

use crate::classifier::classify;
use crate::filter::is_indexable;
use crate::partition::partition_by_version;

/// Entries built from one page of groups.
#[derive(Debug, Default)]
pub struct PageBatch {
    pub entries: Vec<IndexEntry>,
    /// Records dropped by the inclusion filter
    pub skipped: usize,
}

impl PageBatch {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the index entries for one group.
///
/// Each indexable record is classified against its version bucket with that
/// one record removed (by position, so an identical duplicate still counts as
/// a sibling). Non-indexable records are skipped silently.
pub fn build(group: &ArtifactGroup) -> Vec<IndexEntry> {
    let mut entries = Vec::with_capacity(group.len());

    for bucket in partition_by_version(group) {
        for (position, record) in bucket.records.iter().enumerate() {
            if !is_indexable(record) {
                continue;
            }

            let siblings = bucket
                .records
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != position)
                .map(|(_, sibling)| *sibling);

            let flags = classify(record, siblings);
            entries.push(IndexEntry::new((*record).clone(), flags));
        }
    }

    entries
}

/// Build the entries for a whole page of groups, in page order.
pub fn build_page(groups: &[ArtifactGroup]) -> PageBatch {
    let mut batch = PageBatch::default();
    for group in groups {
        let entries = build(group);
        batch.skipped += group.len() - entries.len();
        batch.entries.extend(entries);
    }
    batch
}
