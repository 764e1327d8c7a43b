//! Document mapping between index entries and Tantivy documents.

use tantivy::doc;
use tantivy::schema::Value;
use tantivy::TantivyDocument;

use artifact_types::{CompanionFlags, IndexEntry};

use crate::schema::ArtifactSchema;

/// Convert an index entry to a Tantivy document.
///
/// `repository` is the `storage:repository` label of the indexing context.
pub fn entry_to_doc(schema: &ArtifactSchema, entry: &IndexEntry, repository: &str) -> TantivyDocument {
    let coordinate = &entry.record.coordinate;
    let flags = entry.flags;

    doc!(
        schema.uinfo => coordinate.uinfo(),
        schema.repository => repository,
        schema.group_id => coordinate.group_id.clone(),
        schema.artifact_id => coordinate.artifact_id.clone(),
        schema.version => coordinate.version.clone(),
        schema.classifier => coordinate.classifier.clone().unwrap_or_default(),
        schema.extension => coordinate.extension.clone(),
        schema.path => entry.record.path.clone(),
        schema.file_name => entry.record.file_name(),
        schema.descriptor_exists => u64::from(flags.descriptor_exists),
        schema.sources_exist => u64::from(flags.sources_exist),
        schema.doc_exists => u64::from(flags.doc_exists)
    )
}

/// Stored view of one indexed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedArtifact {
    pub uinfo: String,
    pub repository: String,
    pub path: String,
    pub flags: CompanionFlags,
}

impl IndexedArtifact {
    /// Read the stored fields back out of a document.
    pub fn from_doc(schema: &ArtifactSchema, doc: &TantivyDocument) -> Self {
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let flag = |field| doc.get_first(field).and_then(|v| v.as_u64()) == Some(1);

        Self {
            uinfo: text(schema.uinfo),
            repository: text(schema.repository),
            path: text(schema.path),
            flags: CompanionFlags::new(
                flag(schema.descriptor_exists),
                flag(schema.sources_exist),
                flag(schema.doc_exists),
            ),
        }
    }
}
