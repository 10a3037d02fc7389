//! Configuration management for grafter
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. embedded `default-config.toml`
//! 2. `~/.config/grafter/config.{toml,json,yaml,yml}`, or the file given with
//!    `--config` (which replaces the user files)
//! 3. `GRAFTER_*` environment variables, `__` separating sections
//!    (`GRAFTER_SYNC__QUEUE_CAPACITY=32`)

pub mod formats;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use serde::{Deserialize, Serialize};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrafterConfig {
    pub store: StoreSettings,
    pub sync: SyncSettings,
}

/// Where missions are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Empty means `~/.grafter/missions.yml`.
    #[serde(default)]
    pub path: String,
}

/// Pipeline concurrency knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    pub queue_capacity: usize,
    /// 0 = no cap
    pub max_threads: usize,
    pub thread_percentage: u8,
}

impl GrafterConfig {
    /// Load defaults, the user (or custom) file and the environment.
    pub fn load(custom_config: Option<&Path>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: custom path {:?}", custom_config);
        Self::extract(Self::figment(custom_config))
    }

    /// The layered provider stack before extraction.
    pub fn figment(custom_config: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            figment = figment.merge(formats::auto(custom_path));
        } else if let Some(user) = Self::user_config_path() {
            figment = figment
                .merge(Toml::file(&user))
                .merge(Json::file(user.with_extension("json")))
                .merge(Yaml::file(user.with_extension("yaml")))
                .merge(Yaml::file(user.with_extension("yml")));
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed("GRAFTER_").split("__"))
    }

    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().context("Invalid grafter configuration")?;
        tracing::trace!("CONFIG LOAD: {:?}", config);
        Ok(config)
    }

    /// Mission store location: the configured path, or `~/.grafter/missions.yml`.
    pub fn store_path(&self) -> Option<PathBuf> {
        if self.store.path.is_empty() {
            dirs::home_dir().map(|home| home.join(".grafter").join("missions.yml"))
        } else {
            Some(PathBuf::from(&self.store.path))
        }
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("grafter").join("config.toml"))
    }
}
