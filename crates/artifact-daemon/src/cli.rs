//! CLI argument parsing for the artifact daemon.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Artifact Index Daemon
///
/// Rebuilds per-repository search indexes of Maven artifacts.
#[derive(Parser, Debug)]
#[command(name = "artifact-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/artifact-index/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override metadata store path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the index of one repository
    Rebuild {
        /// Storage id
        #[arg(short, long)]
        storage: String,

        /// Repository id
        #[arg(short, long)]
        repository: String,

        /// Index directory (default: {index_root}/{storage}/{repository})
        #[arg(long)]
        index_dir: Option<PathBuf>,

        /// Override groups fetched per page
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Rebuild the index of every repository in the store
    RebuildAll {
        /// Override groups fetched per page
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Import artifact paths into the metadata store
    Import {
        /// Storage id
        #[arg(short, long)]
        storage: String,

        /// Repository id
        #[arg(short, long)]
        repository: String,

        /// File listing one Maven-layout path per line
        file: PathBuf,
    },

    /// Show metadata store statistics
    Stats,

    /// Trigger RocksDB compaction
    Compact,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
