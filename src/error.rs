//! Error types for grafter.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building rules or running a sync pass.
///
/// Setup variants (`InvalidPattern`, `IgnoreFile`, `InvalidRoot`,
/// `OverlappingRoots`) abort a run before any walking begins. The rest are
/// reported per item and never stop a pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A user-supplied ignore regex failed to compile.
    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The root `.gitignore` exists but could not be parsed or read.
    #[error("failed to load ignore file {path}: {source}")]
    IgnoreFile {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    /// A sync root is missing or is not a directory.
    #[error("root {path} does not exist or is not a directory")]
    InvalidRoot { path: PathBuf },

    /// One sync root lives inside the other.
    #[error("source {source_root} and destination {dest_root} overlap")]
    OverlappingRoots {
        source_root: PathBuf,
        dest_root: PathBuf,
    },

    /// A rule was asked about a path outside the root it was built for.
    #[error("path {path} is not under root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// The directory walker reported an error for one entry.
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A worker or walker thread panicked.
    #[error("thread panic occurred during sync pass")]
    WorkerPanic,
}

/// Errors raised by the mission registry.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("mission `{0}` doesn't exist")]
    NotFound(String),

    #[error("mission `{0}` already exists")]
    AlreadyExists(String),

    /// Removal by index outside `0..len`.
    #[error("ignore index {index} is out of range (mission has {len} patterns)")]
    IgnoreIndexOutOfRange { index: usize, len: usize },

    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but is not valid YAML for a mission store.
    #[error("failed to parse mission store at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("failed to serialize mission store: {0}")]
    Serialize(#[from] serde_yml::Error),

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or pass --store")]
    HomeNotFound,
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
