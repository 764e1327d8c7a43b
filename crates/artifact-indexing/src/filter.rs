//! Inclusion policy for the index.
//!
//! Matches the file-name rules the index consumer applies: repository
//! metadata, property files, signatures and checksums are never indexed.

use artifact_types::ArtifactRecord;

const EXCLUDED_FILE_NAMES: &[&str] = &["maven-metadata.xml"];

const EXCLUDED_SUFFIXES: &[&str] = &[".properties", ".asc", ".md5", ".sha1"];

/// Should this record be indexed at all.
pub fn is_indexable(record: &ArtifactRecord) -> bool {
    is_indexable_file_name(record.file_name())
}

/// Case-sensitive check on the final path segment.
pub fn is_indexable_file_name(file_name: &str) -> bool {
    !(EXCLUDED_FILE_NAMES.contains(&file_name)
        || EXCLUDED_SUFFIXES
            .iter()
            .any(|suffix| file_name.ends_with(suffix)))
}
