//! Tree walker
//!
//! Visits a root depth-first, consults a [`RuleChain`] for every entry below
//! the root, prunes ignored directories and emits the survivors as
//! [`WalkItem`]s. Failures on single entries become `WalkItem::Error` and the
//! traversal carries on.
//!
//! The walker is built on `ignore::WalkBuilder` with every standard filter
//! switched off, so the chain is the only thing deciding what is skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::Sender;
use ignore::WalkBuilder;

use crate::error::{SyncError, io_err};
use crate::rules::{ChainObserver, RuleChain, TracingObserver};

/// One unit of work flowing from the walker to a worker.
#[derive(Debug)]
pub enum WalkItem {
    /// A surviving entry. Directories are informational only.
    Entry { path: PathBuf, is_dir: bool },
    /// A stat or read failure for one entry.
    Error(SyncError),
}

impl WalkItem {
    /// The path of a file entry, `None` for directories and errors.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            WalkItem::Entry { path, is_dir: false } => Some(path),
            _ => None,
        }
    }
}

/// Cooperative stop signal shared by the walker and the workers of a pass.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Depth-first walker over one root.
pub struct Walker {
    root: PathBuf,
    chain: Arc<RuleChain>,
    observer: Arc<dyn ChainObserver>,
    cancel: CancellationToken,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>, chain: Arc<RuleChain>) -> Self {
        Self {
            root: root.into(),
            chain,
            observer: Arc::new(TracingObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChainObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree, handing each item to `emit`. Stops early when `emit`
    /// returns `false` or the token is cancelled. The root itself is never
    /// classified and is not emitted.
    pub fn walk<F>(&self, mut emit: F)
    where
        F: FnMut(WalkItem) -> bool,
    {
        let chain = self.chain.clone();
        let observer = self.observer.clone();

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                // Unstattable entries are let through so the walk loop reports them.
                match fs::symlink_metadata(entry.path()) {
                    Ok(meta) => !chain.is_ignored(entry.path(), &meta, observer.as_ref()),
                    Err(_) => true,
                }
            })
            .build();

        for result in walker {
            if self.cancel.is_cancelled() {
                tracing::debug!("Walk of {} cancelled", self.root.display());
                return;
            }

            let item = match result {
                Ok(entry) if entry.depth() == 0 => continue,
                Ok(entry) => match fs::symlink_metadata(entry.path()) {
                    Ok(meta) => WalkItem::Entry {
                        path: entry.into_path(),
                        is_dir: meta.is_dir(),
                    },
                    Err(e) => WalkItem::Error(io_err(entry.path(), e)),
                },
                Err(e) => WalkItem::Error(SyncError::Walk(e)),
            };

            if let WalkItem::Error(ref e) = item {
                tracing::warn!("Walker[{}] error: {}", self.root.display(), e);
            }
            if !emit(item) {
                return;
            }
        }
    }

    /// Feed items into a channel. Blocks while the channel is full and stops
    /// once every receiver is gone. The sender is dropped on return, which
    /// closes the queue.
    pub fn walk_into(&self, tx: Sender<WalkItem>) {
        self.walk(|item| tx.send(item).is_ok());
    }

    /// Collect every item in memory.
    pub fn collect(&self) -> Vec<WalkItem> {
        let mut items = Vec::new();
        self.walk(|item| {
            items.push(item);
            true
        });
        items
    }
}
