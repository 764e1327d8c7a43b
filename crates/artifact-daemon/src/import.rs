//! Import of Maven-layout path listings into the metadata store.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use artifact_storage::{Storage, StorageError};
use artifact_types::{ArtifactCoordinate, ArtifactGroup, ArtifactRecord};

/// Groups parsed from a listing, plus lines that were not artifact paths.
#[derive(Debug, Default)]
pub struct ParsedListing {
    pub groups: Vec<ArtifactGroup>,
    pub invalid: Vec<String>,
}

/// Outcome of inserting parsed groups.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub records: usize,
}

/// Name under which a coordinate's group is stored.
pub fn group_name(coordinate: &ArtifactCoordinate) -> String {
    format!("{}:{}", coordinate.group_id, coordinate.artifact_id)
}

/// Parse one path per line into artifact-id groups.
///
/// Blank lines and `#` comments are ignored. Groups keep first-seen order and
/// records keep listing order.
pub fn parse_listing(text: &str, storage_id: &str, repository_id: &str) -> ParsedListing {
    let mut listing = ParsedListing::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for line in text.lines() {
        let path = line.trim();
        if path.is_empty() || path.starts_with('#') {
            continue;
        }

        let coordinate = match ArtifactCoordinate::parse_path(path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path, error = %e, "Skipping line");
                listing.invalid.push(path.to_string());
                continue;
            }
        };

        let name = group_name(&coordinate);
        let record = ArtifactRecord::new(path.trim_start_matches('/'), coordinate);
        match positions.get(&name) {
            Some(&i) => listing.groups[i].push(record),
            None => {
                positions.insert(name.clone(), listing.groups.len());
                listing
                    .groups
                    .push(ArtifactGroup::new(storage_id, repository_id, name).with_artifact(record));
            }
        }
    }

    listing
}

/// Insert groups, counting duplicates instead of failing on them.
pub fn import_groups(
    storage: &Storage,
    groups: &[ArtifactGroup],
) -> Result<ImportSummary, StorageError> {
    let mut summary = ImportSummary::default();

    for group in groups {
        match storage.insert_group(group) {
            Ok(()) => {
                summary.inserted += 1;
                summary.records += group.len();
            }
            Err(e @ StorageError::ConstraintViolation { .. }) => {
                warn!(group = %group.name, error = %e, "Group already exists, skipping");
                summary.duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        records = summary.records,
        "Import complete"
    );
    Ok(summary)
}
