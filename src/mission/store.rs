use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Mission;
use crate::error::MissionError;

pub const STORE_VERSION: &str = "1.0.0";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: String,
    #[serde(default)]
    missions: Vec<Mission>,
}

/// YAML-backed registry of missions.
///
/// ```yaml
/// version: 1.0.0
/// missions:
///   - name: docs
///     src: /home/me/project/docs
///     dest: /srv/www/docs
///     ignore:
///       - \.draft\.md$
/// ```
#[derive(Debug)]
pub struct MissionStore {
    path: PathBuf,
    version: String,
    missions: Vec<Mission>,
    modified: bool,
}

impl MissionStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MissionError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!("No mission store at {}, starting empty", path.display());
            return Ok(Self {
                path,
                version: STORE_VERSION.to_string(),
                missions: Vec::new(),
                modified: false,
            });
        }

        let contents = fs::read_to_string(&path).map_err(|source| MissionError::Io {
            path: path.clone(),
            source,
        })?;
        let file: StoreFile = if contents.trim().is_empty() {
            StoreFile::default()
        } else {
            serde_yml::from_str(&contents).map_err(|source| MissionError::Parse {
                path: path.clone(),
                source,
            })?
        };

        Ok(Self {
            path,
            version: if file.version.is_empty() {
                STORE_VERSION.to_string()
            } else {
                file.version
            },
            missions: file.missions,
            modified: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn get(&self, name: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.name == name)
    }

    /// Mutable access. Marks the store modified, since callers take this to edit.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Mission> {
        let mission = self.missions.iter_mut().find(|m| m.name == name)?;
        self.modified = true;
        Some(mission)
    }

    /// Like [`get`](Self::get) but failing with `NotFound`.
    pub fn require(&self, name: &str) -> Result<&Mission, MissionError> {
        self.get(name)
            .ok_or_else(|| MissionError::NotFound(name.to_string()))
    }

    pub fn add(&mut self, mission: Mission) -> Result<(), MissionError> {
        if self.get(&mission.name).is_some() {
            return Err(MissionError::AlreadyExists(mission.name));
        }
        self.missions.push(mission);
        self.modified = true;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Mission, MissionError> {
        let index = self
            .missions
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| MissionError::NotFound(name.to_string()))?;
        self.modified = true;
        Ok(self.missions.remove(index))
    }

    /// Write the store back if anything changed. Returns whether a write happened.
    pub fn save(&mut self) -> Result<bool, MissionError> {
        if !self.modified {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MissionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = StoreFile {
            version: self.version.clone(),
            missions: self.missions.clone(),
        };
        let yaml = serde_yml::to_string(&file)?;
        fs::write(&self.path, yaml).map_err(|source| MissionError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Saved {} missions to {}", self.missions.len(), self.path.display());
        self.modified = false;
        Ok(true)
    }
}
