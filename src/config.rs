//! Config file location and contents.
//!
//! Directory priority:
//! 1. CLI `--config-dir`
//! 2. `FOLIO_CONFIG_DIR` environment variable
//! 3. Current directory, if it already contains `folio.json`
//! 4. Platform config directory from dirs-next (`~/.config/folio` on Linux)
//!
//! A missing config file means defaults; a malformed one is an error.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::carousel::CarouselProps;
use crate::core::relevance::{DEFAULT_RELATED_LIMIT, RelevanceWeights};

pub const CONFIG_FILE_NAME: &str = "folio.json";
pub const CONFIG_DIR_ENV: &str = "FOLIO_CONFIG_DIR";

/// Overrides for the default config location
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// CLI argument wins over the environment variable.
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from));
        Self { config_dir }
    }

    pub fn config_file(&self, name: &str) -> PathBuf {
        self.config_dir().join(name)
    }

    pub fn config_dir(&self) -> PathBuf {
        if let Some(dir) = &self.config_dir {
            return dir.clone();
        }

        if let Ok(current_dir) = std::env::current_dir()
            && current_dir.join(CONFIG_FILE_NAME).exists()
        {
            return current_dir;
        }

        if let Some(dir) = dirs_next::config_dir() {
            return dir.join("folio");
        }

        PathBuf::from(".")
    }
}

/// Persistent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Related items shown per page
    pub related_limit: usize,
    /// Entries kept by the related-content memo
    pub related_cache_capacity: usize,
    pub weights: RelevanceWeights,
    pub carousel: CarouselProps,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            related_limit: DEFAULT_RELATED_LIMIT,
            related_cache_capacity: 64,
            weights: RelevanceWeights::default(),
            carousel: CarouselProps::default(),
        }
    }
}

impl FolioConfig {
    /// Load from `path`; defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn load(paths: &PathConfig) -> Result<Self> {
        Self::load_from(&paths.config_file(CONFIG_FILE_NAME))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::carousel::DisplayMode;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_config_file_with_custom_dir() {
        let paths = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(paths.config_file("folio.json"), PathBuf::from("/custom/folio.json"));
    }

    #[test]
    fn test_cli_dir_wins() {
        let paths = PathConfig::from_env_and_cli(Some(PathBuf::from("/from/cli")));
        assert_eq!(paths.config_dir(), PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = temp_dir("folio_test_config_missing");
        let config = FolioConfig::load_from(&dir.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.related_limit, 3);
        assert_eq!(config.carousel.interval_ms, 4000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = temp_dir("folio_test_config_partial");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"related_limit": 5, "carousel": {"display": "contain"}, "weights": {"tag": 4}}"#).unwrap();

        let config = FolioConfig::load_from(&path).unwrap();
        assert_eq!(config.related_limit, 5);
        assert_eq!(config.carousel.display, DisplayMode::Contain);
        assert_eq!(config.carousel.interval_ms, 4000);
        assert_eq!(config.weights.tag, 4);
        assert_eq!(config.weights.category, 10);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_file_errors() {
        let dir = temp_dir("folio_test_config_bad");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, "{ nope").unwrap();

        let err = FolioConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_then_load() {
        let dir = temp_dir("folio_test_config_save");
        let path = dir.join("nested").join(CONFIG_FILE_NAME);

        let mut config = FolioConfig::default();
        config.carousel.autoplay = false;
        config.save_to(&path).unwrap();

        assert_eq!(FolioConfig::load_from(&path).unwrap(), config);
        let _ = fs::remove_dir_all(&dir);
    }
}
