//! Index rebuild for one repository.
//!
//! A rebuild purges the repository's index, pages through every artifact-id
//! group in the metadata store, submits one batch of index entries per page
//! and finally packs the index:
//!
//! ```text
//! Created -> Purged -> Paging -> Sealed
//!     \         \         \
//!      +---------+---------+--> Failed
//! ```
//!
//! The purge happens before population, so a failed rebuild leaves the index
//! empty or partially populated until the next successful rebuild.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use artifact_types::RepositoryIdentity;

use crate::builder::build_page;
use crate::error::{IndexingError, RebuildError, RebuildStage};
use crate::fetcher::{GroupPageFetcher, GroupSource};
use crate::lease::RepositoryLeases;
use crate::writer::{IndexWriter, IndexingContext};

/// Default number of groups per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Configuration for rebuild operations.
#[derive(Debug, Clone)]
pub struct RebuildConfig {
    /// Number of artifact-id groups fetched per page.
    pub page_size: usize,
}

impl Default for RebuildConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl RebuildConfig {
    /// Set the page size.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn validate(&self) -> Result<(), IndexingError> {
        if self.page_size == 0 {
            return Err(IndexingError::Config(
                "page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Lifecycle state of a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildState {
    #[default]
    Created,
    Purged,
    Paging,
    Sealed,
    Failed,
}

impl fmt::Display for RebuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RebuildState::Created => "created",
            RebuildState::Purged => "purged",
            RebuildState::Paging => "paging",
            RebuildState::Sealed => "sealed",
            RebuildState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Progress tracking for a rebuild.
#[derive(Debug, Clone, Default)]
pub struct RebuildProgress {
    /// Current state.
    pub state: RebuildState,
    /// Groups reported by the store's count.
    pub total_groups: u64,
    /// Number of pages planned.
    pub pages_planned: u64,
    /// Number of pages fetched so far.
    pub pages_fetched: u64,
    /// Groups processed so far.
    pub groups_processed: u64,
    /// Index entries accepted by the writer.
    pub entries_submitted: u64,
    /// Records excluded by the indexability filter.
    pub records_skipped: u64,
}

impl RebuildProgress {
    /// Create a new progress tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processed page.
    pub fn record_page(&mut self, groups: usize, submitted: usize, skipped: usize) {
        self.pages_fetched += 1;
        self.groups_processed += groups as u64;
        self.entries_submitted += submitted as u64;
        self.records_skipped += skipped as u64;
    }

    /// Fraction of planned pages fetched, 1.0 when nothing is planned.
    pub fn fraction_done(&self) -> f64 {
        if self.pages_planned == 0 {
            1.0
        } else {
            self.pages_fetched as f64 / self.pages_planned as f64
        }
    }
}

/// Result of a successful rebuild.
#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub repository: RepositoryIdentity,
    pub total_groups: u64,
    pub pages_fetched: u64,
    pub entries_submitted: u64,
    pub records_skipped: u64,
    /// Time taken in milliseconds.
    pub elapsed_ms: u64,
    pub state: RebuildState,
}

/// Trait for receiving rebuild progress updates.
pub trait ProgressCallback: Send {
    /// Called after every state change and every page.
    fn on_progress(&self, repository: &RepositoryIdentity, progress: &RebuildProgress);
}

/// A no-op progress callback for when progress reporting isn't needed.
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_progress(&self, _repository: &RepositoryIdentity, _progress: &RebuildProgress) {}
}

/// A callback that logs progress at info level every `every_pages` pages.
pub struct LoggingProgressCallback {
    every_pages: u64,
}

impl LoggingProgressCallback {
    /// Create a new logging progress callback.
    pub fn new(every_pages: u64) -> Self {
        Self {
            every_pages: every_pages.max(1),
        }
    }
}

impl ProgressCallback for LoggingProgressCallback {
    fn on_progress(&self, repository: &RepositoryIdentity, progress: &RebuildProgress) {
        if progress.state == RebuildState::Paging
            && progress.pages_fetched % self.every_pages != 0
        {
            return;
        }
        info!(
            repository = %repository,
            state = %progress.state,
            pages = progress.pages_fetched,
            of = progress.pages_planned,
            percent = (progress.fraction_done() * 100.0).round() as u32,
            entries = progress.entries_submitted,
            skipped = progress.records_skipped,
            "Rebuild progress"
        );
    }
}

/// Drives rebuilds of repository indexes.
///
/// Holds the metadata store, the index writer and the lease map. Rebuilds of
/// distinct repositories may run concurrently on clones sharing one lease map.
#[derive(Clone)]
pub struct RebuildOrchestrator {
    fetcher: Arc<GroupPageFetcher>,
    writer: Arc<dyn IndexWriter>,
    leases: RepositoryLeases,
}

impl RebuildOrchestrator {
    /// Create an orchestrator with its own lease map.
    pub fn new(
        source: Arc<dyn GroupSource>,
        writer: Arc<dyn IndexWriter>,
        config: RebuildConfig,
    ) -> Result<Self, IndexingError> {
        Self::with_leases(source, writer, config, RepositoryLeases::new())
    }

    /// Create an orchestrator sharing an existing lease map.
    pub fn with_leases(
        source: Arc<dyn GroupSource>,
        writer: Arc<dyn IndexWriter>,
        config: RebuildConfig,
        leases: RepositoryLeases,
    ) -> Result<Self, IndexingError> {
        config.validate()?;
        Ok(Self {
            fetcher: Arc::new(GroupPageFetcher::new(source, config.page_size)),
            writer,
            leases,
        })
    }

    pub fn leases(&self) -> &RepositoryLeases {
        &self.leases
    }

    pub fn page_size(&self) -> usize {
        self.fetcher.page_size()
    }

    /// Rebuild without cancellation or progress reporting.
    pub fn rebuild(&self, repository: &RepositoryIdentity) -> Result<RebuildReport, RebuildError> {
        self.rebuild_with(repository, &CancellationToken::new(), &NoOpProgressCallback)
    }

    /// Rebuild the index of `repository`.
    ///
    /// `cancel` is checked before the purge, before each page and before the
    /// pack. A cancelled rebuild never packs. On any failure the writer is told
    /// to release what it holds for the index location.
    pub fn rebuild_with(
        &self,
        repository: &RepositoryIdentity,
        cancel: &CancellationToken,
        progress_callback: &dyn ProgressCallback,
    ) -> Result<RebuildReport, RebuildError> {
        let _lease = self
            .leases
            .try_acquire(repository)
            .ok_or_else(|| RebuildError::AlreadyRunning(repository.to_string()))?;

        let started = Instant::now();
        let mut progress = RebuildProgress::new();
        let result = self.run(repository, cancel, progress_callback, &mut progress);

        match result {
            Ok(()) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(
                    repository = %repository,
                    writer = self.writer.name(),
                    groups = progress.total_groups,
                    pages = progress.pages_fetched,
                    entries = progress.entries_submitted,
                    skipped = progress.records_skipped,
                    elapsed_ms,
                    "Rebuild complete"
                );
                Ok(RebuildReport {
                    repository: repository.clone(),
                    total_groups: progress.total_groups,
                    pages_fetched: progress.pages_fetched,
                    entries_submitted: progress.entries_submitted,
                    records_skipped: progress.records_skipped,
                    elapsed_ms,
                    state: progress.state,
                })
            }
            Err(e) => {
                self.writer.release(&repository.index_location);
                progress.state = RebuildState::Failed;
                progress_callback.on_progress(repository, &progress);
                warn!(
                    repository = %repository,
                    stage = ?e.stage(),
                    pages = progress.pages_fetched,
                    entries = progress.entries_submitted,
                    error = %e,
                    "Rebuild failed, index is unreliable until the next successful rebuild"
                );
                Err(e)
            }
        }
    }

    fn run(
        &self,
        repository: &RepositoryIdentity,
        cancel: &CancellationToken,
        progress_callback: &dyn ProgressCallback,
        progress: &mut RebuildProgress,
    ) -> Result<(), RebuildError> {
        let context = IndexingContext::new(repository.clone());
        let failed = |stage: RebuildStage| {
            move |source: IndexingError| RebuildError::Failed {
                repository: repository.to_string(),
                stage,
                source,
            }
        };
        let cancelled = |stage: RebuildStage| RebuildError::Cancelled {
            repository: repository.to_string(),
            stage,
        };

        if cancel.is_cancelled() {
            return Err(cancelled(RebuildStage::Purge));
        }

        info!(
            repository = %repository,
            location = ?context.index_location(),
            writer = self.writer.name(),
            "Starting index rebuild"
        );
        self.writer
            .purge(context.index_location())
            .map_err(failed(RebuildStage::Purge))?;
        progress.state = RebuildState::Purged;
        progress_callback.on_progress(repository, progress);

        let total = self
            .fetcher
            .count(repository)
            .map_err(failed(RebuildStage::Paging))?;
        progress.total_groups = total;
        progress.pages_planned = self.fetcher.page_count(total);
        progress.state = RebuildState::Paging;
        debug!(
            repository = %repository,
            total,
            pages = progress.pages_planned,
            page_size = self.fetcher.page_size(),
            "Planned rebuild pages"
        );

        for page in 0..progress.pages_planned {
            if cancel.is_cancelled() {
                return Err(cancelled(RebuildStage::Paging));
            }

            let groups = self
                .fetcher
                .fetch_page(repository, page)
                .map_err(failed(RebuildStage::Paging))?;
            let batch = build_page(&groups);
            let submitted = self
                .writer
                .add_entries(&batch.entries, &context)
                .map_err(failed(RebuildStage::Paging))?;

            progress.record_page(groups.len(), submitted, batch.skipped);
            progress_callback.on_progress(repository, progress);
        }

        if cancel.is_cancelled() {
            return Err(cancelled(RebuildStage::Sealing));
        }

        self.writer
            .pack(context.index_location(), &context)
            .map_err(failed(RebuildStage::Sealing))?;
        progress.state = RebuildState::Sealed;
        progress_callback.on_progress(repository, progress);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;

    use artifact_types::{ArtifactCoordinate, ArtifactGroup, ArtifactRecord, IndexEntry};

    #[derive(Debug, Clone, PartialEq)]
    enum WriterCall {
        Purge,
        Add(usize),
        Pack,
        Release,
    }

    /// In-memory store holding `total` single-jar groups.
    struct FakeSource {
        total: u64,
        fail_count: bool,
        fetches: Mutex<Vec<u64>>,
    }

    impl FakeSource {
        fn with_groups(total: u64) -> Self {
            Self {
                total,
                fail_count: false,
                fetches: Mutex::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<u64> {
            self.fetches.lock().unwrap().clone()
        }
    }

    impl GroupSource for FakeSource {
        fn count(&self, _storage_id: &str, _repository_id: &str) -> Result<u64, IndexingError> {
            if self.fail_count {
                return Err(IndexingError::StoreUnavailable("down".to_string()));
            }
            Ok(self.total)
        }

        fn fetch_groups(
            &self,
            storage_id: &str,
            repository_id: &str,
            offset: u64,
            limit: usize,
        ) -> Result<Vec<ArtifactGroup>, IndexingError> {
            self.fetches.lock().unwrap().push(offset);
            let end = self.total.min(offset + limit as u64);
            Ok((offset..end)
                .map(|i| {
                    let name = format!("lib-{:04}", i);
                    let jar = ArtifactCoordinate::new("org.example", &name, "1.0", None, "jar");
                    let sha = format!("{}.sha1", jar.to_path());
                    ArtifactGroup::new(storage_id, repository_id, &name)
                        .with_artifact(ArtifactRecord::new(jar.to_path(), jar.clone()))
                        .with_artifact(ArtifactRecord::new(sha, jar))
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeWriter {
        calls: Mutex<Vec<WriterCall>>,
        fail_purge: bool,
        fail_add_on_call: Option<usize>,
        fail_pack: bool,
    }

    impl FakeWriter {
        fn calls(&self) -> Vec<WriterCall> {
            self.calls.lock().unwrap().clone()
        }

        fn packed(&self) -> bool {
            self.calls().contains(&WriterCall::Pack)
        }

        fn adds(&self) -> Vec<usize> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    WriterCall::Add(n) => Some(n),
                    _ => None,
                })
                .collect()
        }
    }

    impl IndexWriter for FakeWriter {
        fn purge(&self, _location: &Path) -> Result<(), IndexingError> {
            if self.fail_purge {
                return Err(IndexingError::WriterFailure("io".to_string()));
            }
            self.calls.lock().unwrap().push(WriterCall::Purge);
            Ok(())
        }

        fn add_entries(
            &self,
            batch: &[IndexEntry],
            _context: &IndexingContext,
        ) -> Result<usize, IndexingError> {
            let mut calls = self.calls.lock().unwrap();
            let add_number = calls
                .iter()
                .filter(|c| matches!(c, WriterCall::Add(_)))
                .count()
                + 1;
            if self.fail_add_on_call == Some(add_number) {
                return Err(IndexingError::WriterFailure("disk full".to_string()));
            }
            calls.push(WriterCall::Add(batch.len()));
            Ok(batch.len())
        }

        fn pack(&self, _location: &Path, _context: &IndexingContext) -> Result<(), IndexingError> {
            if self.fail_pack {
                return Err(IndexingError::WriterFailure("pack".to_string()));
            }
            self.calls.lock().unwrap().push(WriterCall::Pack);
            Ok(())
        }

        fn release(&self, _location: &Path) {
            self.calls.lock().unwrap().push(WriterCall::Release);
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// Records every state it is told about.
    struct RecordingCallback {
        states: Mutex<Vec<RebuildState>>,
    }

    impl ProgressCallback for RecordingCallback {
        fn on_progress(&self, _repository: &RepositoryIdentity, progress: &RebuildProgress) {
            self.states.lock().unwrap().push(progress.state);
        }
    }

    fn identity() -> RepositoryIdentity {
        RepositoryIdentity::new("storage0", "releases", "/tmp/index/storage0/releases")
    }

    fn orchestrator(source: Arc<FakeSource>, writer: Arc<FakeWriter>) -> RebuildOrchestrator {
        RebuildOrchestrator::new(source, writer, RebuildConfig::default()).unwrap()
    }

    #[test]
    fn test_rebuild_config_default() {
        let config = RebuildConfig::default();
        assert_eq!(config.page_size, 100);
        assert!(config.validate().is_ok());
        assert!(RebuildConfig::default().with_page_size(0).validate().is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = RebuildOrchestrator::new(
            Arc::new(FakeSource::with_groups(1)),
            Arc::new(FakeWriter::default()),
            RebuildConfig::default().with_page_size(0),
        );
        assert!(matches!(result, Err(IndexingError::Config(_))));
    }

    #[test]
    fn test_rebuild_250_groups() {
        let source = Arc::new(FakeSource::with_groups(250));
        let writer = Arc::new(FakeWriter::default());
        let report = orchestrator(source.clone(), writer.clone())
            .rebuild(&identity())
            .unwrap();

        assert_eq!(source.offsets(), vec![0, 100, 200]);
        assert_eq!(
            writer.calls(),
            vec![
                WriterCall::Purge,
                WriterCall::Add(100),
                WriterCall::Add(100),
                WriterCall::Add(50),
                WriterCall::Pack,
            ]
        );
        assert_eq!(report.total_groups, 250);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.entries_submitted, 250);
        assert_eq!(report.records_skipped, 250);
        assert_eq!(report.state, RebuildState::Sealed);
    }

    #[test]
    fn test_rebuild_empty_repository_seals_without_fetching() {
        let source = Arc::new(FakeSource::with_groups(0));
        let writer = Arc::new(FakeWriter::default());
        let report = orchestrator(source.clone(), writer.clone())
            .rebuild(&identity())
            .unwrap();

        assert!(source.offsets().is_empty());
        assert_eq!(writer.calls(), vec![WriterCall::Purge, WriterCall::Pack]);
        assert_eq!(report.pages_fetched, 0);
    }

    #[test]
    fn test_exact_multiple_fetches_no_extra_page() {
        let source = Arc::new(FakeSource::with_groups(200));
        let writer = Arc::new(FakeWriter::default());
        orchestrator(source.clone(), writer.clone())
            .rebuild(&identity())
            .unwrap();

        assert_eq!(source.offsets(), vec![0, 100]);
        assert_eq!(writer.adds(), vec![100, 100]);
    }

    #[test]
    fn test_add_failure_on_second_page() {
        let source = Arc::new(FakeSource::with_groups(250));
        let writer = Arc::new(FakeWriter {
            fail_add_on_call: Some(2),
            ..Default::default()
        });
        let err = orchestrator(source.clone(), writer.clone())
            .rebuild(&identity())
            .unwrap_err();

        assert_eq!(err.stage(), Some(RebuildStage::Paging));
        assert!(matches!(
            err,
            RebuildError::Failed {
                source: IndexingError::WriterFailure(_),
                ..
            }
        ));
        assert!(!writer.packed());
        // First page stays submitted.
        assert_eq!(writer.adds(), vec![100]);
        assert_eq!(source.offsets(), vec![0, 100]);
    }

    #[test]
    fn test_purge_failure_skips_population() {
        let source = Arc::new(FakeSource::with_groups(10));
        let writer = Arc::new(FakeWriter {
            fail_purge: true,
            ..Default::default()
        });
        let err = orchestrator(source.clone(), writer.clone())
            .rebuild(&identity())
            .unwrap_err();

        assert_eq!(err.stage(), Some(RebuildStage::Purge));
        assert!(source.offsets().is_empty());
        assert_eq!(writer.calls(), vec![WriterCall::Release]);
    }

    #[test]
    fn test_count_failure_is_paging_failure() {
        let source = Arc::new(FakeSource {
            fail_count: true,
            ..FakeSource::with_groups(10)
        });
        let writer = Arc::new(FakeWriter::default());
        let err = orchestrator(source, writer.clone())
            .rebuild(&identity())
            .unwrap_err();

        assert_eq!(err.stage(), Some(RebuildStage::Paging));
        assert!(matches!(
            err,
            RebuildError::Failed {
                source: IndexingError::StoreUnavailable(_),
                ..
            }
        ));
        assert_eq!(writer.calls(), vec![WriterCall::Purge, WriterCall::Release]);
    }

    #[test]
    fn test_pack_failure_keeps_entries() {
        let source = Arc::new(FakeSource::with_groups(5));
        let writer = Arc::new(FakeWriter {
            fail_pack: true,
            ..Default::default()
        });
        let err = orchestrator(source, writer.clone())
            .rebuild(&identity())
            .unwrap_err();

        assert_eq!(err.stage(), Some(RebuildStage::Sealing));
        assert_eq!(writer.adds(), vec![5]);
        assert_eq!(writer.calls().last(), Some(&WriterCall::Release));
    }

    #[test]
    fn test_cancel_between_pages() {
        struct CancelAfterFirstPage(CancellationToken);

        impl ProgressCallback for CancelAfterFirstPage {
            fn on_progress(&self, _repository: &RepositoryIdentity, progress: &RebuildProgress) {
                if progress.pages_fetched == 1 {
                    self.0.cancel();
                }
            }
        }

        let source = Arc::new(FakeSource::with_groups(250));
        let writer = Arc::new(FakeWriter::default());
        let token = CancellationToken::new();
        let err = orchestrator(source.clone(), writer.clone())
            .rebuild_with(&identity(), &token, &CancelAfterFirstPage(token.clone()))
            .unwrap_err();

        assert!(matches!(
            err,
            RebuildError::Cancelled {
                stage: RebuildStage::Paging,
                ..
            }
        ));
        assert_eq!(source.offsets(), vec![0]);
        assert!(!writer.packed());
        assert_eq!(
            writer.calls(),
            vec![WriterCall::Purge, WriterCall::Add(100), WriterCall::Release]
        );
    }

    #[test]
    fn test_cancelled_before_start_skips_purge() {
        let source = Arc::new(FakeSource::with_groups(10));
        let writer = Arc::new(FakeWriter::default());
        let token = CancellationToken::new();
        token.cancel();

        let err = orchestrator(source, writer.clone())
            .rebuild_with(&identity(), &token, &NoOpProgressCallback)
            .unwrap_err();

        assert_eq!(err.stage(), Some(RebuildStage::Purge));
        assert_eq!(writer.calls(), vec![WriterCall::Release]);
    }

    #[test]
    fn test_already_running() {
        let orchestrator = orchestrator(
            Arc::new(FakeSource::with_groups(1)),
            Arc::new(FakeWriter::default()),
        );
        let _held = orchestrator.leases().try_acquire(&identity()).unwrap();

        let err = orchestrator.rebuild(&identity()).unwrap_err();
        assert!(matches!(err, RebuildError::AlreadyRunning(_)));
        assert_eq!(err.stage(), None);

        let other = RepositoryIdentity::new("storage0", "snapshots", "/tmp/other");
        assert!(orchestrator.rebuild(&other).is_ok());
    }

    #[test]
    fn test_successful_rebuild_does_not_release() {
        let writer = Arc::new(FakeWriter::default());
        orchestrator(Arc::new(FakeSource::with_groups(3)), writer.clone())
            .rebuild(&identity())
            .unwrap();

        assert!(!writer.calls().contains(&WriterCall::Release));
    }

    #[test]
    fn test_lease_released_after_failure() {
        let writer = Arc::new(FakeWriter {
            fail_pack: true,
            ..Default::default()
        });
        let orchestrator = orchestrator(Arc::new(FakeSource::with_groups(1)), writer);

        assert!(orchestrator.rebuild(&identity()).is_err());
        assert!(!orchestrator.leases().is_held(&identity()));
    }

    #[test]
    fn test_progress_states() {
        let callback = RecordingCallback {
            states: Mutex::new(Vec::new()),
        };
        orchestrator(
            Arc::new(FakeSource::with_groups(150)),
            Arc::new(FakeWriter::default()),
        )
        .rebuild_with(&identity(), &CancellationToken::new(), &callback)
        .unwrap();

        assert_eq!(
            *callback.states.lock().unwrap(),
            vec![
                RebuildState::Purged,
                RebuildState::Paging,
                RebuildState::Paging,
                RebuildState::Sealed,
            ]
        );
    }

    #[test]
    fn test_rebuild_progress_fraction() {
        let mut progress = RebuildProgress::new();
        assert_eq!(progress.fraction_done(), 1.0);

        progress.pages_planned = 4;
        progress.record_page(100, 90, 10);
        assert_eq!(progress.fraction_done(), 0.25);
        assert_eq!(progress.groups_processed, 100);
        assert_eq!(progress.entries_submitted, 90);
        assert_eq!(progress.records_skipped, 10);
    }

    #[test]
    fn test_logging_callback_does_not_panic() {
        let callback = LoggingProgressCallback::new(0);
        let mut progress = RebuildProgress::new();
        progress.state = RebuildState::Paging;
        progress.record_page(1, 1, 0);
        callback.on_progress(&identity(), &progress);
    }
}
