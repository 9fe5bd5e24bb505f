//! Planner configuration.
//!
//! Stored as `config.json` in the data directory. Every field has a default,
//! so a missing file or a partial one both load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::workload::OVERALLOCATION_THRESHOLD;

const CONFIG_FILE: &str = "config.json";

/// Lowest usable overallocation threshold; at 1 every assigned day is flagged.
pub const MIN_OVERALLOCATION_THRESHOLD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Duration in days for tasks added without one.
    #[serde(default = "default_duration")]
    pub default_duration: u32,

    /// Simultaneous tasks per person per day that raise an alert.
    #[serde(default = "default_overallocation_threshold")]
    pub overallocation_threshold: usize,

    /// Days shown by the resource calendar.
    #[serde(default = "default_calendar_days")]
    pub calendar_days: usize,
}

fn default_duration() -> u32 {
    5
}

fn default_overallocation_threshold() -> usize {
    OVERALLOCATION_THRESHOLD
}

fn default_calendar_days() -> usize {
    14
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
            overallocation_threshold: default_overallocation_threshold(),
            calendar_days: default_calendar_days(),
        }
    }
}

impl Config {
    /// Load `config.json` from `dir`, or the defaults if there is none.
    pub fn load(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.overallocation_threshold < MIN_OVERALLOCATION_THRESHOLD {
            return Err(StoreError::InvalidConfig(format!(
                "overallocationThreshold must be at least {}, got {}",
                MIN_OVERALLOCATION_THRESHOLD, self.overallocation_threshold
            )));
        }
        Ok(())
    }

    pub fn save(&self, dir: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(dir.join(CONFIG_FILE), content)?;
        Ok(())
    }

    /// Write the default config if none exists. Returns whether it wrote one.
    pub fn init(dir: &Path) -> Result<bool, StoreError> {
        if dir.join(CONFIG_FILE).exists() {
            return Ok(false);
        }
        Self::default().save(dir)?;
        Ok(true)
    }
}

/// `$HOME/.wbs`, or `./.wbs` when `HOME` is unset.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".wbs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_duration, 5);
        assert_eq!(config.overallocation_threshold, 3);
        assert_eq!(config.calendar_days, 14);
    }

    #[test]
    fn test_load_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(Config::load(tmp.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), r#"{"calendarDays": 28}"#).unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.calendar_days, 28);
        assert_eq!(config.default_duration, 5);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let config = Config { overallocation_threshold: 2, ..Config::default() };
        config.save(tmp.path()).unwrap();
        assert_eq!(Config::load(tmp.path()).unwrap(), config);
    }

    #[test]
    fn test_init() {
        let tmp = TempDir::new().unwrap();
        assert!(Config::init(tmp.path()).unwrap());
        assert!(!Config::init(tmp.path()).unwrap());
        assert!(tmp.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_threshold_below_two_is_rejected() {
        let tmp = TempDir::new().unwrap();
        for threshold in [0, 1] {
            fs::write(tmp.path().join(CONFIG_FILE), format!(r#"{{"overallocationThreshold": {threshold}}}"#)).unwrap();
            assert!(matches!(Config::load(tmp.path()), Err(StoreError::InvalidConfig(_))));
        }
        fs::write(tmp.path().join(CONFIG_FILE), r#"{"overallocationThreshold": 2}"#).unwrap();
        assert_eq!(Config::load(tmp.path()).unwrap().overallocation_threshold, 2);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "calendarDays = 3").unwrap();
        assert!(matches!(Config::load(tmp.path()), Err(StoreError::Json(_))));
    }
}
