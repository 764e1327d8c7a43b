//! Command implementations for the artifact daemon.
//!
//! Handles:
//! - rebuild: Rebuild one repository's index, cancellable with Ctrl+C
//! - rebuild-all: Rebuild every repository in the store concurrently
//! - import: Load a path listing into the metadata store
//! - stats / compact: Store administration

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures::future::join_all;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use artifact_indexing::{
    LoggingProgressCallback, RebuildConfig, RebuildError, RebuildOrchestrator, RebuildReport,
    StorageGroupSource, TantivyIndexWriter,
};
use artifact_storage::Storage;
use artifact_types::{RepositoryIdentity, Settings};

use crate::import::{import_groups, parse_listing};

/// Log progress every this many pages.
const PROGRESS_EVERY_PAGES: u64 = 10;

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    db_path_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(db_path) = db_path_override {
        settings.db_path = db_path.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    Ok(settings)
}

/// Initialize logging. `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Open the metadata store, creating parent directories if needed.
pub fn open_storage(settings: &Settings) -> Result<Arc<Storage>> {
    let db_path = settings.expanded_db_path();
    info!("Opening storage at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let storage = Storage::open(&db_path).context("Failed to open storage")?;
    Ok(Arc::new(storage))
}

fn build_orchestrator(
    storage: Arc<Storage>,
    settings: &Settings,
    page_size_override: Option<usize>,
) -> Result<RebuildOrchestrator> {
    let page_size = page_size_override.unwrap_or(settings.page_size);
    let source = Arc::new(StorageGroupSource::new(storage));
    let writer = Arc::new(TantivyIndexWriter::default());
    RebuildOrchestrator::new(source, writer, RebuildConfig::default().with_page_size(page_size))
        .context("Invalid rebuild configuration")
}

/// Cancel `token` on Ctrl+C or SIGTERM.
fn cancel_on_shutdown(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, cancelling after the current page...");
            }
            _ = terminate => {
                info!("Received SIGTERM, cancelling after the current page...");
            }
            _ = token.cancelled() => return,
        }
        token.cancel();
    });
}

/// Run one rebuild on the blocking pool.
async fn spawn_rebuild(
    orchestrator: RebuildOrchestrator,
    identity: RepositoryIdentity,
    token: CancellationToken,
) -> Result<std::result::Result<RebuildReport, RebuildError>> {
    tokio::task::spawn_blocking(move || {
        let callback = LoggingProgressCallback::new(PROGRESS_EVERY_PAGES);
        orchestrator.rebuild_with(&identity, &token, &callback)
    })
    .await
    .context("Rebuild task panicked")
}

fn print_report(report: &RebuildReport) {
    println!("Rebuilt {}", report.repository);
    println!("  Index:    {:?}", report.repository.index_location);
    println!("  Groups:   {}", report.total_groups);
    println!("  Pages:    {}", report.pages_fetched);
    println!("  Entries:  {}", report.entries_submitted);
    println!("  Skipped:  {}", report.records_skipped);
    println!("  Elapsed:  {} ms", report.elapsed_ms);
}

/// Rebuild the index of one repository.
pub async fn rebuild_repository(
    settings: &Settings,
    storage_id: &str,
    repository_id: &str,
    index_dir: Option<&Path>,
    page_size_override: Option<usize>,
) -> Result<()> {
    let storage = open_storage(settings)?;
    let orchestrator = build_orchestrator(storage, settings, page_size_override)?;

    let identity = match index_dir {
        Some(dir) => RepositoryIdentity::new(storage_id, repository_id, dir),
        None => RepositoryIdentity::under_root(
            &settings.expanded_index_root(),
            storage_id,
            repository_id,
        ),
    };

    let token = CancellationToken::new();
    cancel_on_shutdown(token.clone());

    let outcome = spawn_rebuild(orchestrator, identity, token.clone()).await;
    token.cancel();

    let report = outcome??;
    print_report(&report);
    Ok(())
}

/// Rebuild every repository known to the store, one blocking task each.
pub async fn rebuild_all(settings: &Settings, page_size_override: Option<usize>) -> Result<()> {
    let storage = open_storage(settings)?;
    let repositories = storage
        .list_repositories()
        .context("Failed to list repositories")?;

    if repositories.is_empty() {
        println!("No repositories in store");
        return Ok(());
    }

    let orchestrator = build_orchestrator(storage, settings, page_size_override)?;
    let index_root: PathBuf = settings.expanded_index_root();
    let token = CancellationToken::new();
    cancel_on_shutdown(token.clone());

    info!(count = repositories.len(), "Rebuilding all repositories");
    let tasks = repositories.into_iter().map(|(storage_id, repository_id)| {
        let identity = RepositoryIdentity::under_root(&index_root, storage_id, repository_id);
        spawn_rebuild(orchestrator.clone(), identity, token.clone())
    });
    let outcomes = join_all(tasks).await;
    token.cancel();

    let mut failed = 0usize;
    for outcome in outcomes {
        match outcome? {
            Ok(report) => print_report(&report),
            Err(e) => {
                error!(error = %e, "Rebuild failed");
                eprintln!("{}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} repository rebuild(s) failed", failed);
    }
    Ok(())
}

/// Import a path listing into the store.
pub fn import_listing(
    settings: &Settings,
    storage_id: &str,
    repository_id: &str,
    file: &Path,
) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read listing {:?}", file))?;
    let listing = parse_listing(&text, storage_id, repository_id);
    for line in &listing.invalid {
        warn!(path = %line, "Not a Maven artifact path");
    }

    let storage = open_storage(settings)?;
    let summary = import_groups(&storage, &listing.groups).context("Import failed")?;
    storage.flush().context("Failed to flush storage")?;

    println!("Imported into {}:{}", storage_id, repository_id);
    println!("  Groups inserted:   {}", summary.inserted);
    println!("  Records inserted:  {}", summary.records);
    println!("  Existing groups:   {}", summary.duplicates);
    println!("  Invalid lines:     {}", listing.invalid.len());
    Ok(())
}

/// Print store statistics.
pub fn show_stats(settings: &Settings) -> Result<()> {
    let storage = open_storage(settings)?;
    let stats = storage.get_stats().context("Failed to read statistics")?;

    println!("Database: {}", settings.db_path);
    println!("  Repositories: {}", stats.repository_count);
    println!("  Groups:       {}", stats.group_count);
    println!("  Artifacts:    {}", stats.artifact_count);
    println!("  Disk usage:   {} bytes", stats.disk_usage_bytes);
    Ok(())
}

/// Compact the store.
pub fn compact(settings: &Settings) -> Result<()> {
    let storage = open_storage(settings)?;
    info!("Compacting storage...");
    storage.compact().context("Compaction failed")?;
    println!("Compaction complete");
    Ok(())
}
