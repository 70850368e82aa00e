//! Global today configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{TodayError, TodayResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/today";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

/// Configuration at ~/.config/today/config.toml
///
/// Every key can be overridden from the environment with a `TODAY_` prefix
/// (e.g. `TODAY_DATA_DIR`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TodayConfig {
    /// Holds the URL list and the feed cache.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for TodayConfig {
    fn default() -> Self {
        TodayConfig {
            data_dir: default_data_dir(),
        }
    }
}

impl TodayConfig {
    pub fn config_path() -> TodayResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TodayError::Config("Could not determine config directory".into()))?
            .join("today");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> TodayResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TodayResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("TODAY"))
            .build()
            .map_err(|e| TodayError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TodayError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TodayResult<()> {
        let contents = format!(
            "\
# today configuration

# Where the feed list and the cached calendars live:
# data_dir = \"{}\"
",
            DEFAULT_DATA_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TodayError::io(parent, e))?;
        }

        std::fs::write(path, contents).map_err(|e| TodayError::io(path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("today/config.toml");

        TodayConfig::create_default_config(&path).unwrap();
        let config = TodayConfig::load_from(&path).unwrap();

        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert!(!config.data_path().starts_with("~"));
    }

    #[test]
    fn test_data_dir_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/srv/today\"\n").unwrap();

        let config = TodayConfig::load_from(&path).unwrap();
        assert_eq!(config.data_path(), PathBuf::from("/srv/today"));
    }
}
