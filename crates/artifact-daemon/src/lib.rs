//! Artifact daemon library exports.
//!
//! This crate provides the CLI binary for the artifact index.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (rebuild, import, stats, compact)
//! - `import`: Path listing parsing and store import

pub mod cli;
pub mod commands;
pub mod import;

pub use cli::{Cli, Commands};
pub use commands::{
    compact, import_listing, init_logging, load_settings, open_storage, rebuild_all,
    rebuild_repository, show_stats,
};
pub use import::{import_groups, parse_listing, ImportSummary, ParsedListing};
