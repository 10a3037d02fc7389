//! Missions
//!
//! A mission names one source/destination pairing together with its ordered
//! list of ignore regexes. Missions are persisted by [`MissionStore`].

pub mod store;

pub use store::MissionStore;

use std::fmt;
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MissionError;

/// One grafting mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub name: String,
    pub src: PathBuf,
    pub dest: PathBuf,
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Mission {
    pub fn new(name: impl Into<String>, src: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            src: src.into(),
            dest: dest.into(),
            ignore: Vec::new(),
        }
    }

    /// Append an ignore regex unless it is already listed. The expression is
    /// compiled first so a bad pattern never reaches the store.
    pub fn add_ignore(&mut self, expr: &str) -> Result<bool, MissionError> {
        Regex::new(expr).map_err(|source| MissionError::InvalidPattern {
            pattern: expr.to_string(),
            source,
        })?;
        if self.ignore.iter().any(|existing| existing == expr) {
            return Ok(false);
        }
        self.ignore.push(expr.to_string());
        Ok(true)
    }

    /// Remove the pattern at `index`, returning it.
    pub fn remove_ignore(&mut self, index: usize) -> Result<String, MissionError> {
        if index >= self.ignore.len() {
            return Err(MissionError::IgnoreIndexOutOfRange {
                index,
                len: self.ignore.len(),
            });
        }
        Ok(self.ignore.remove(index))
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name:   {}", self.name)?;
        writeln!(f, "Src:    {}", self.src.display())?;
        writeln!(f, "Dest:   {}", self.dest.display())?;
        write!(f, "Ignore:")?;
        if self.ignore.is_empty() {
            write!(f, " (none)")?;
        }
        for (i, expr) in self.ignore.iter().enumerate() {
            write!(f, "\n  {i}. {expr}")?;
        }
        Ok(())
    }
}
