//! Exclusion rules
//!
//! A [`Rule`] answers one question for one concern: should this filesystem
//! entry be left out of the sync? Rules are built once per pass and never
//! mutated afterwards, so a chain of them can be shared read-only between the
//! walker and the workers.
//!
//! The set of rules is closed:
//!
//! ```text
//! Dotfile     base name starts with '.'
//! Irregular   symlinks, fifos, sockets, devices, anything not file or dir
//! VcsIgnore   root .gitignore, standard gitignore precedence
//! Pattern     user regex against the full path string
//! ```
//!
//! Rules are combined by [`RuleChain`] (first match wins).

pub mod chain;

pub use chain::{ChainObserver, RuleChain, TracingObserver};

use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use regex::Regex;

use crate::error::SyncError;

/// Name of the VCS ignore file consulted at the sync root.
pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// A single exclusion predicate.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Ignores entries whose base name starts with `.`.
    Dotfile,
    /// Ignores every entry that is neither a regular file nor a directory.
    Irregular,
    /// Delegates to the gitignore matcher rooted at the sync root.
    VcsIgnore(VcsIgnore),
    /// Ignores paths whose full string form matches the regex.
    Pattern(Regex),
}

impl Rule {
    /// Compile a pattern rule. An invalid regex fails here, not at evaluation.
    pub fn pattern(expr: &str) -> Result<Self, SyncError> {
        Regex::new(expr)
            .map(Rule::Pattern)
            .map_err(|source| SyncError::InvalidPattern {
                pattern: expr.to_string(),
                source,
            })
    }

    /// Compile one pattern rule per expression, preserving order.
    pub fn patterns<S: AsRef<str>>(exprs: &[S]) -> Result<Vec<Self>, SyncError> {
        exprs.iter().map(|e| Self::pattern(e.as_ref())).collect()
    }

    /// Load the gitignore rule for `root`.
    pub fn vcs_ignore(root: &Path) -> Result<Self, SyncError> {
        VcsIgnore::load(root).map(Rule::VcsIgnore)
    }

    /// Short name used in trace output.
    pub fn name(&self) -> String {
        match self {
            Rule::Dotfile => "dotfile".to_string(),
            Rule::Irregular => "irregular-type".to_string(),
            Rule::VcsIgnore(_) => "gitignore".to_string(),
            Rule::Pattern(re) => format!("pattern({})", re.as_str()),
        }
    }

    /// Returns `Ok(true)` when this rule excludes `path`.
    ///
    /// `metadata` must describe the entry itself, not a symlink target.
    pub fn evaluate(&self, path: &Path, metadata: &Metadata) -> Result<bool, SyncError> {
        match self {
            Rule::Dotfile => Ok(path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('.'))),
            Rule::Irregular => {
                let ft = metadata.file_type();
                Ok(!ft.is_file() && !ft.is_dir())
            }
            Rule::VcsIgnore(vcs) => vcs.is_ignored(path, metadata.is_dir()),
            Rule::Pattern(re) => Ok(re.is_match(&path.to_string_lossy())),
        }
    }
}

/// Gitignore matcher anchored at a sync root.
#[derive(Debug, Clone)]
pub struct VcsIgnore {
    root: PathBuf,
    matcher: Gitignore,
}

impl VcsIgnore {
    /// Parse `<root>/.gitignore`. A missing file yields an empty matcher; an
    /// unreadable or malformed one is a setup error.
    pub fn load(root: &Path) -> Result<Self, SyncError> {
        let file = root.join(IGNORE_FILE_NAME);
        match fs::symlink_metadata(&file) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    root: root.to_path_buf(),
                    matcher: Gitignore::empty(),
                });
            }
            Err(e) => {
                return Err(SyncError::IgnoreFile {
                    path: file,
                    source: ignore::Error::Io(e),
                });
            }
        }

        let mut builder = GitignoreBuilder::new(root);
        if let Some(source) = builder.add(&file) {
            return Err(SyncError::IgnoreFile { path: file, source });
        }
        let matcher = builder
            .build()
            .map_err(|source| SyncError::IgnoreFile { path: file, source })?;

        tracing::debug!(
            "Loaded {} gitignore rules from {}",
            matcher.num_ignores(),
            root.display()
        );
        Ok(Self {
            root: root.to_path_buf(),
            matcher,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` (or one of its parents) is ignored. Whitelist entries
    /// (`!pattern`) win over earlier ignores, as in git.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> Result<bool, SyncError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| SyncError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;
        if relative.as_os_str().is_empty() {
            return Ok(false);
        }
        Ok(self
            .matcher
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore())
    }
}
