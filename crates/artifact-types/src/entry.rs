//! Index entries: the unit submitted to the search index.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactRecord;

/// Which companions exist next to a primary artifact within its version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionFlags {
    /// An unclassified `pom` sibling exists
    pub descriptor_exists: bool,
    /// A `sources` sibling with the same extension exists
    pub sources_exist: bool,
    /// A `javadoc` sibling with the same extension exists
    pub doc_exists: bool,
}

impl CompanionFlags {
    pub fn new(descriptor_exists: bool, sources_exist: bool, doc_exists: bool) -> Self {
        Self {
            descriptor_exists,
            sources_exist,
            doc_exists,
        }
    }

    /// All-false flags.
    pub fn none() -> Self {
        Self::default()
    }
}

/// An artifact paired with its companion flags.
///
/// Entries own a copy of the record so a page of groups can be dropped as soon
/// as its batch is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub record: ArtifactRecord,
    pub flags: CompanionFlags,
}

impl IndexEntry {
    pub fn new(record: ArtifactRecord, flags: CompanionFlags) -> Self {
        Self { record, flags }
    }
}
