//! Artifact Index Daemon
//!
//! Rebuilds per-repository search indexes of Maven artifacts from the
//! metadata store.
//!
//! # Usage
//!
//! ```bash
//! artifact-daemon rebuild --storage S --repository R [--index-dir DIR] [--page-size N]
//! artifact-daemon rebuild-all [--page-size N]
//! artifact-daemon import --storage S --repository R FILE
//! artifact-daemon stats
//! artifact-daemon compact
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/artifact-index/config.toml)
//! 3. Environment variables (ARTIFACT_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use artifact_daemon::{
    compact, import_listing, init_logging, load_settings, rebuild_all, rebuild_repository,
    show_stats, Cli, Commands,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(
        cli.config.as_deref(),
        cli.db_path.as_deref(),
        cli.log_level.as_deref(),
    )?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Rebuild {
            storage,
            repository,
            index_dir,
            page_size,
        } => {
            rebuild_repository(
                &settings,
                &storage,
                &repository,
                index_dir.as_deref(),
                page_size,
            )
            .await?;
        }
        Commands::RebuildAll { page_size } => {
            rebuild_all(&settings, page_size).await?;
        }
        Commands::Import {
            storage,
            repository,
            file,
        } => {
            import_listing(&settings, &storage, &repository, &file)?;
        }
        Commands::Stats => {
            show_stats(&settings)?;
        }
        Commands::Compact => {
            compact(&settings)?;
        }
    }

    Ok(())
}
