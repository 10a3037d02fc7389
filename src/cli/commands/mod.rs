//! Command implementations for the grafter CLI

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::Output;
use crate::config::GrafterConfig;
use crate::error::MissionError;
use crate::mission::MissionStore;

pub mod graft;
pub mod ignore;
pub mod info;
pub mod init;
pub mod list;
pub mod unregister;

/// State shared by every command.
pub struct Context {
    pub config: GrafterConfig,
    pub store_path: PathBuf,
    pub output: Output,
}

impl Context {
    pub fn load(
        config_path: Option<&Path>,
        store_override: Option<PathBuf>,
        output: Output,
    ) -> Result<Self> {
        let config = GrafterConfig::load(config_path)?;
        let store_path = match store_override {
            Some(path) => path,
            None => config.store_path().ok_or(MissionError::HomeNotFound)?,
        };
        tracing::debug!("Mission store: {}", store_path.display());

        Ok(Self {
            config,
            store_path,
            output,
        })
    }

    pub fn open_store(&self) -> Result<MissionStore> {
        MissionStore::open(&self.store_path)
            .with_context(|| format!("Failed to open mission store {}", self.store_path.display()))
    }

    pub fn save_store(&self, store: &mut MissionStore) -> Result<()> {
        store.save().with_context(|| {
            format!("Failed to save mission store {}", self.store_path.display())
        })?;
        Ok(())
    }
}
