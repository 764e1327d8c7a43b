//! Column family definitions for RocksDB.
//!
//! - artifact_groups: artifact-id groups keyed by `grp:{storage}:{repository}:{name}`

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for artifact-id groups
pub const CF_ARTIFACT_GROUPS: &str = "artifact_groups";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_ARTIFACT_GROUPS];

/// Groups are read in large sequential scans; compress them.
fn groups_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![ColumnFamilyDescriptor::new(
        CF_ARTIFACT_GROUPS,
        groups_options(),
    )]
}
