//! Companion classification.
//!
//! A primary artifact's companions are its same-version siblings: the
//! unclassified `pom` descriptor, and `sources`/`javadoc` bundles packaged with
//! the same extension as the primary (a jar's javadoc is itself a jar).

use artifact_types::coordinate::{JAVADOC_CLASSIFIER, SOURCES_CLASSIFIER};
use artifact_types::{ArtifactRecord, CompanionFlags};

/// Compute which companions exist for `record` among `siblings`.
///
/// `siblings` must be the record's version bucket without the record itself.
/// Companions themselves (sources, javadoc, pom) and records without siblings
/// get all-false flags without scanning. The result does not depend on
/// sibling order.
pub fn classify<'a, I>(record: &ArtifactRecord, siblings: I) -> CompanionFlags
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    let mut siblings = siblings.into_iter().peekable();
    if siblings.peek().is_none() || record.coordinate.is_companion() {
        return CompanionFlags::none();
    }

    let extension = &record.coordinate.extension;
    let mut flags = CompanionFlags::none();

    for sibling in siblings {
        let coordinate = &sibling.coordinate;
        flags.descriptor_exists |= coordinate.is_descriptor();
        if &coordinate.extension == extension {
            flags.doc_exists |= coordinate.has_classifier(JAVADOC_CLASSIFIER);
            flags.sources_exist |= coordinate.has_classifier(SOURCES_CLASSIFIER);
        }
    }

    flags
}
