//! Artifact coordinates.
//!
//! A coordinate is the semantic identity of one file inside a Maven-layout
//! repository: `groupId:artifactId:version[:classifier]@extension`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ArtifactError;

/// Classifier carried by source bundles.
pub const SOURCES_CLASSIFIER: &str = "sources";

/// Classifier carried by documentation bundles.
pub const JAVADOC_CLASSIFIER: &str = "javadoc";

/// Extension of the project descriptor.
pub const POM_EXTENSION: &str = "pom";

/// Placeholder used in `uinfo` strings when no classifier is present.
const NO_CLASSIFIER: &str = "NA";

/// Semantic identity of one artifact file.
///
/// Versions are opaque strings: the pipeline only compares them for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// `None` when the file carries no classifier.
    #[serde(default)]
    pub classifier: Option<String>,
    pub extension: String,
}

impl ArtifactCoordinate {
    /// Create a coordinate. An empty classifier is stored as `None`.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        classifier: Option<&str>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: classifier.filter(|c| !c.is_empty()).map(str::to_string),
            extension: extension.into(),
        }
    }

    /// True when the classifier equals `classifier`.
    pub fn has_classifier(&self, classifier: &str) -> bool {
        self.classifier.as_deref() == Some(classifier)
    }

    /// True for source bundles, documentation bundles and descriptors.
    ///
    /// Companions never get companion flags of their own.
    pub fn is_companion(&self) -> bool {
        self.has_classifier(SOURCES_CLASSIFIER)
            || self.has_classifier(JAVADOC_CLASSIFIER)
            || self.extension == POM_EXTENSION
    }

    /// True for the unclassified `pom` descriptor.
    pub fn is_descriptor(&self) -> bool {
        self.extension == POM_EXTENSION && self.classifier.is_none()
    }

    /// Unique info string `g|a|v|c|e`, with `NA` for a missing classifier.
    pub fn uinfo(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.group_id,
            self.artifact_id,
            self.version,
            self.classifier.as_deref().unwrap_or(NO_CLASSIFIER),
            self.extension
        )
    }

    /// Parse a path relative to the repository root, e.g.
    /// `org/example/lib/1.0/lib-1.0-sources.jar`.
    ///
    /// The file name must start with `{artifactId}-{version}`; whatever follows
    /// is an optional `-classifier` and then the extension (everything after
    /// the first dot, so `lib-1.0.jar.sha1` has extension `jar.sha1`).
    pub fn parse_path(path: &str) -> Result<Self, ArtifactError> {
        trace!(path, "parsing artifact path");

        let invalid = || ArtifactError::InvalidPath(path.to_string());
        let path = path.trim_start_matches('/');

        let (without_file, file_name) = path.rsplit_once('/').ok_or_else(invalid)?;
        let (without_version, version) = without_file.rsplit_once('/').ok_or_else(invalid)?;
        let (group_path, artifact_id) = without_version.rsplit_once('/').ok_or_else(invalid)?;

        if group_path.is_empty() || artifact_id.is_empty() || version.is_empty() {
            return Err(invalid());
        }

        let stem = format!("{}-{}", artifact_id, version);
        let rest = file_name.strip_prefix(stem.as_str()).ok_or_else(invalid)?;

        let (classifier, extension) = if let Some(classified) = rest.strip_prefix('-') {
            let (classifier, extension) = classified.split_once('.').ok_or_else(invalid)?;
            (Some(classifier), extension)
        } else if let Some(extension) = rest.strip_prefix('.') {
            (None, extension)
        } else {
            return Err(invalid());
        };

        if extension.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(
            group_path.replace('/', "."),
            artifact_id,
            version,
            classifier,
            extension,
        ))
    }

    /// Repository-relative path for this coordinate.
    pub fn to_path(&self) -> String {
        let classifier = self
            .classifier
            .as_deref()
            .map(|c| format!("-{}", c))
            .unwrap_or_default();
        format!(
            "{}/{}/{}/{}-{}{}.{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.artifact_id,
            self.version,
            classifier,
            self.extension
        )
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, "@{}", self.extension)
    }
}
