//! Configuration loading and management
//!
//! Handles parsing of `.rota.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Hard bounds on the materialization horizon. A runaway `months_ahead`
/// would only bloat the store, so it is clamped rather than rejected.
pub const MIN_MONTHS_AHEAD: u32 = 1;
pub const MAX_MONTHS_AHEAD: u32 = 36;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schedule configuration
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
        }
    }
}

/// Schedule-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// How many months ahead to materialize occurrences
    #[serde(default = "default_months_ahead")]
    pub months_ahead: u32,
}

fn default_months_ahead() -> u32 {
    12
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            months_ahead: default_months_ahead(),
        }
    }
}

impl ScheduleConfig {
    /// Horizon length with the configured value clamped into sane bounds
    pub fn clamped_months_ahead(&self) -> u32 {
        self.months_ahead.clamp(MIN_MONTHS_AHEAD, MAX_MONTHS_AHEAD)
    }
}

impl Config {
    /// Load configuration from a `.rota.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        Ok(config)
    }

    /// Load configuration from the working directory. A missing file means
    /// defaults; a file that fails to parse is fatal to the run.
    pub fn load_from_dir(dir: &Path) -> crate::error::Result<Self> {
        let config_path = dir.join(crate::storage::CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
