//! # Grafter - one-shot directory mirroring
//!
//! Grafter copies a source tree into a destination tree and then prunes
//! destination files that no longer exist in the source. Entries are filtered
//! by an ordered rule chain: dotfiles, non-regular files, the root
//! `.gitignore` and user regexes matched against full paths.
//!
//! ## Quick Start
//!
//! ```bash
//! grafter init docs ~/project/docs /srv/www/docs
//! grafter ignore add docs '\.draft\.md$'
//! grafter graft docs
//! ```
//!
//! The same pipeline is available as a library:
//!
//! ```no_run
//! use grafter::sync::SyncPipeline;
//!
//! let report = SyncPipeline::new("/src/site", "/srv/site", vec![r"\.tmp$".to_string()]).run()?;
//! println!("copied {} files", report.copied);
//! # Ok::<(), grafter::error::SyncError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mission;
pub mod parallel;
pub mod rules;
pub mod sync;
pub mod walk;

pub use cli::{Cli, Output};
pub use config::GrafterConfig;
pub use error::{MissionError, SyncError};
pub use mission::{Mission, MissionStore};
pub use sync::{SyncOptions, SyncPipeline, SyncReport};

/// Result type alias for grafter operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
