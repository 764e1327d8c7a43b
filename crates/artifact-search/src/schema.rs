//! Tantivy schema definition for artifact documents.
//!
//! One document per indexable artifact file. `uinfo` is the primary key.

use tantivy::schema::{Field, Schema, INDEXED, STORED, STRING, TEXT};

use crate::SearchError;

/// Schema field handles for efficient access
#[derive(Debug, Clone)]
pub struct ArtifactSchema {
    schema: Schema,
    /// Primary key: `g|a|v|c|e` (STRING | STORED)
    pub uinfo: Field,
    /// `storage:repository` the artifact belongs to (STRING | STORED)
    pub repository: Field,
    pub group_id: Field,
    pub artifact_id: Field,
    pub version: Field,
    /// Empty string when absent
    pub classifier: Field,
    pub extension: Field,
    /// Repository-relative storage path (STRING | STORED)
    pub path: Field,
    /// File name, tokenized for keyword search (TEXT | STORED)
    pub file_name: Field,
    /// Companion flags, 0 or 1 (INDEXED | STORED)
    pub descriptor_exists: Field,
    pub sources_exist: Field,
    pub doc_exists: Field,
}

impl ArtifactSchema {
    /// Get the underlying Tantivy schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create an ArtifactSchema from an existing Tantivy Schema
    pub fn from_schema(schema: Schema) -> Result<Self, SearchError> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| SearchError::SchemaMismatch(format!("missing {} field", name)))
        };

        Ok(Self {
            uinfo: field("uinfo")?,
            repository: field("repository")?,
            group_id: field("group_id")?,
            artifact_id: field("artifact_id")?,
            version: field("version")?,
            classifier: field("classifier")?,
            extension: field("extension")?,
            path: field("path")?,
            file_name: field("file_name")?,
            descriptor_exists: field("descriptor_exists")?,
            sources_exist: field("sources_exist")?,
            doc_exists: field("doc_exists")?,
            schema,
        })
    }
}

/// Build the artifact schema.
pub fn build_artifact_schema() -> ArtifactSchema {
    let mut schema_builder = Schema::builder();

    let uinfo = schema_builder.add_text_field("uinfo", STRING | STORED);
    let repository = schema_builder.add_text_field("repository", STRING | STORED);
    let group_id = schema_builder.add_text_field("group_id", STRING | STORED);
    let artifact_id = schema_builder.add_text_field("artifact_id", STRING | STORED);
    let version = schema_builder.add_text_field("version", STRING | STORED);
    let classifier = schema_builder.add_text_field("classifier", STRING | STORED);
    let extension = schema_builder.add_text_field("extension", STRING | STORED);
    let path = schema_builder.add_text_field("path", STRING | STORED);
    let file_name = schema_builder.add_text_field("file_name", TEXT | STORED);
    let descriptor_exists = schema_builder.add_u64_field("descriptor_exists", INDEXED | STORED);
    let sources_exist = schema_builder.add_u64_field("sources_exist", INDEXED | STORED);
    let doc_exists = schema_builder.add_u64_field("doc_exists", INDEXED | STORED);

    ArtifactSchema {
        schema: schema_builder.build(),
        uinfo,
        repository,
        group_id,
        artifact_id,
        version,
        classifier,
        extension,
        path,
        file_name,
        descriptor_exists,
        sources_exist,
        doc_exists,
    }
}
