use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_EMERGENCY_LIMIT_DAYS: u32 = 20;

/// Run-level settings for the engine.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// emergency_limit_days = 30
/// seed = 7
/// snapshot_dir = "history"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Days a calorie emergency stays open before it expires.
    pub emergency_limit_days: u32,
    /// Seed for the engine's random draws (coastal yield, newborn gender, names).
    pub seed: u64,
    /// When set, the whole graph is exported here before each day's mutation.
    pub snapshot_dir: Option<PathBuf>,
    /// Run the daily partner-matching pass.
    pub partnering: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            emergency_limit_days: DEFAULT_EMERGENCY_LIMIT_DAYS,
            seed: 0,
            snapshot_dir: None,
            partnering: true,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_emergency_limit(mut self, days: u32) -> Self {
        self.emergency_limit_days = days;
        self
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    pub fn without_partnering(mut self) -> Self {
        self.partnering = false;
        self
    }
}
