//! Sync pipeline
//!
//! A run is two passes over one mission, each a walker feeding a worker pool:
//!
//! ```text
//! copy pass   walk SOURCE (chain rooted at source)
//!             file missing or size differs at DEST  → copy
//!             same size                             → skip
//!
//! prune pass  walk DEST (chain rooted at destination)
//!             no counterpart under SOURCE           → delete file
//!             counterpart exists                    → keep
//!             existence check fails                 → keep, record error
//! ```
//!
//! Setup problems (bad regex, unreadable `.gitignore`, missing root) abort
//! the pass before walking. Failures on single items are logged, recorded in
//! the [`SyncReport`] and never stop the pass. Nothing is retried.
//!
//! Change detection is by size only. Two files of equal length but different
//! content are treated as identical.

pub mod transfer;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam::channel::Receiver;
use serde::Serialize;

use crate::config::SyncSettings;
use crate::error::{SyncError, io_err};
use crate::mission::Mission;
use crate::parallel::{WorkerPool, calculate_optimal_workers};
use crate::rules::{ChainObserver, RuleChain, TracingObserver};
use crate::walk::{CancellationToken, WalkItem, Walker};

/// Default bound of the walker → worker queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Concurrency settings of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Worker threads per pass.
    pub workers: usize,
    /// Walker queue bound, at least 1.
    pub queue_capacity: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            workers: calculate_optimal_workers(0, 100),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl SyncOptions {
    pub fn from_settings(settings: &SyncSettings) -> Self {
        Self {
            workers: calculate_optimal_workers(settings.max_threads, settings.thread_percentage),
            queue_capacity: settings.queue_capacity.max(1),
        }
    }

    /// Zero workers means the calculated default.
    fn pool(&self) -> WorkerPool {
        let workers = match self.workers {
            0 => calculate_optimal_workers(0, 100),
            n => n,
        };
        WorkerPool::new(workers, self.queue_capacity)
    }
}

/// A single failed item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemError {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl From<&SyncError> for ItemError {
    fn from(error: &SyncError) -> Self {
        Self {
            path: error_path(error),
            message: error.to_string(),
        }
    }
}

/// Aggregate outcome of one or more passes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Files written to the destination.
    pub copied: usize,
    /// Source files left alone because the destination had the same size.
    pub skipped: usize,
    /// Destination files removed for lacking a source counterpart.
    pub deleted: usize,
    /// Destination files whose source counterpart exists.
    pub kept: usize,
    pub bytes_copied: u64,
    pub errors: Vec<ItemError>,
}

impl SyncReport {
    pub fn merge(&mut self, other: SyncReport) {
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.deleted += other.deleted;
        self.kept += other.kept;
        self.bytes_copied += other.bytes_copied;
        self.errors.extend(other.errors);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn record_error(&mut self, error: &SyncError) {
        self.errors.push(ItemError::from(error));
    }

    fn merged(reports: Vec<SyncReport>) -> SyncReport {
        reports.into_iter().fold(SyncReport::default(), |mut acc, r| {
            acc.merge(r);
            acc
        })
    }
}

/// Mirrors a source root into a destination root.
pub struct SyncPipeline {
    source_root: PathBuf,
    dest_root: PathBuf,
    patterns: Vec<String>,
    options: SyncOptions,
    observer: Arc<dyn ChainObserver>,
    cancel: CancellationToken,
}

impl SyncPipeline {
    pub fn new(
        source_root: impl Into<PathBuf>,
        dest_root: impl Into<PathBuf>,
        patterns: Vec<String>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            patterns,
            options: SyncOptions::default(),
            observer: Arc::new(TracingObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn for_mission(mission: &Mission) -> Self {
        Self::new(&mission.src, &mission.dest, mission.ignore.clone())
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChainObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Copy pass followed by prune pass. The prune pass is skipped when the
    /// run was cancelled during copying.
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let mut report = self.copy_pass()?;
        if self.cancel.is_cancelled() {
            tracing::info!("Sync cancelled after copy pass");
            return Ok(report);
        }
        report.merge(self.prune_pass()?);
        Ok(report)
    }

    /// Bring every unignored source file over to the destination.
    pub fn copy_pass(&self) -> Result<SyncReport, SyncError> {
        require_dir(&self.source_root)?;
        self.check_overlap()?;
        if !self.dest_root.exists() {
            fs::create_dir_all(&self.dest_root).map_err(|e| io_err(&self.dest_root, e))?;
        }

        let chain = Arc::new(RuleChain::standard(&self.source_root, &self.patterns)?);
        tracing::info!(
            "Copy pass {} -> {} ({} workers)",
            self.source_root.display(),
            self.dest_root.display(),
            self.options.workers
        );

        let walker = self.walker(&self.source_root, chain);
        let reports = self
            .options
            .pool()
            .run(|tx| walker.walk_into(tx), |id, rx| self.copy_worker(id, rx))?;
        Ok(SyncReport::merged(reports))
    }

    /// Remove destination files that have no source counterpart. Directories
    /// are never removed.
    pub fn prune_pass(&self) -> Result<SyncReport, SyncError> {
        require_dir(&self.source_root)?;
        require_dir(&self.dest_root)?;
        self.check_overlap()?;

        let chain = Arc::new(RuleChain::standard(&self.dest_root, &self.patterns)?);
        tracing::info!(
            "Prune pass {} against {} ({} workers)",
            self.dest_root.display(),
            self.source_root.display(),
            self.options.workers
        );

        let walker = self.walker(&self.dest_root, chain);
        let reports = self
            .options
            .pool()
            .run(|tx| walker.walk_into(tx), |id, rx| self.prune_worker(id, rx))?;
        Ok(SyncReport::merged(reports))
    }

    fn walker(&self, root: &Path, chain: Arc<RuleChain>) -> Walker {
        Walker::new(root, chain)
            .with_observer(self.observer.clone())
            .with_cancellation(self.cancel.clone())
    }

    fn copy_worker(&self, worker_id: usize, rx: Receiver<WalkItem>) -> SyncReport {
        let mut report = SyncReport::default();
        for item in rx.iter() {
            if self.cancel.is_cancelled() {
                break;
            }
            match item {
                WalkItem::Error(e) => {
                    tracing::info!("Receive error from walker: {}", e);
                    report.record_error(&e);
                }
                WalkItem::Entry { is_dir: true, .. } => {}
                WalkItem::Entry { path, .. } => self.copy_one(&path, &mut report),
            }
        }
        tracing::trace!("Copy worker {} done", worker_id);
        report
    }

    fn copy_one(&self, source: &Path, report: &mut SyncReport) {
        let outcome = counterpart(source, &self.source_root, &self.dest_root).and_then(|dest| {
            let comparison = transfer::compare(source, &dest)?;
            if !comparison.needs_copy() {
                return Ok(None);
            }
            transfer::copy_file(source, &dest).map(|bytes| Some((dest, bytes)))
        });

        match outcome {
            Ok(Some((dest, bytes))) => {
                tracing::info!("Copied {} -> {}", source.display(), dest.display());
                report.copied += 1;
                report.bytes_copied += bytes;
            }
            Ok(None) => {
                tracing::trace!("Unchanged {}", source.display());
                report.skipped += 1;
            }
            Err(e) => {
                tracing::error!("Failed to copy {}: {}", source.display(), e);
                report.record_error(&e);
            }
        }
    }

    fn prune_worker(&self, worker_id: usize, rx: Receiver<WalkItem>) -> SyncReport {
        let mut report = SyncReport::default();
        for item in rx.iter() {
            if self.cancel.is_cancelled() {
                break;
            }
            match item {
                WalkItem::Error(e) => {
                    tracing::info!("Receive error from walker: {}", e);
                    report.record_error(&e);
                }
                WalkItem::Entry { is_dir: true, .. } => {}
                WalkItem::Entry { path, .. } => self.prune_one(&path, &mut report),
            }
        }
        tracing::trace!("Prune worker {} done", worker_id);
        report
    }

    fn prune_one(&self, dest: &Path, report: &mut SyncReport) {
        let source = match counterpart(dest, &self.dest_root, &self.source_root) {
            Ok(source) => source,
            Err(e) => {
                report.record_error(&e);
                return;
            }
        };

        match transfer::exists(&source) {
            Ok(true) => report.kept += 1,
            Ok(false) => match fs::remove_file(dest) {
                Ok(()) => {
                    tracing::info!("Removed {}", dest.display());
                    report.deleted += 1;
                }
                Err(e) => {
                    let e = io_err(dest, e);
                    tracing::error!("Failed to remove {}: {}", dest.display(), e);
                    report.record_error(&e);
                }
            },
            Err(e) => {
                tracing::error!("Keeping {}, could not check source: {}", dest.display(), e);
                report.record_error(&e);
            }
        }
    }

    fn check_overlap(&self) -> Result<(), SyncError> {
        if self.source_root.starts_with(&self.dest_root)
            || self.dest_root.starts_with(&self.source_root)
        {
            return Err(SyncError::OverlappingRoots {
                source_root: self.source_root.clone(),
                dest_root: self.dest_root.clone(),
            });
        }
        Ok(())
    }
}

/// Swap the `from` prefix of `path` for `to`, keeping the suffix verbatim.
pub fn counterpart(path: &Path, from: &Path, to: &Path) -> Result<PathBuf, SyncError> {
    path.strip_prefix(from)
        .map(|relative| to.join(relative))
        .map_err(|_| SyncError::OutsideRoot {
            path: path.to_path_buf(),
            root: from.to_path_buf(),
        })
}

/// The root must be a directory this process can list.
fn require_dir(path: &Path) -> Result<(), SyncError> {
    if path.is_dir() {
        fs::read_dir(path).map_err(|e| io_err(path, e))?;
        Ok(())
    } else {
        Err(SyncError::InvalidRoot {
            path: path.to_path_buf(),
        })
    }
}

fn error_path(error: &SyncError) -> Option<PathBuf> {
    match error {
        SyncError::Io { path, .. } | SyncError::OutsideRoot { path, .. } => Some(path.clone()),
        SyncError::Walk(e) => walk_error_path(e),
        _ => None,
    }
}

fn walk_error_path(error: &ignore::Error) -> Option<PathBuf> {
    match error {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            walk_error_path(err)
        }
        _ => None,
    }
}
