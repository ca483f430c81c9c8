//! Configuration loading for vmatch.

use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "VMATCH_CONFIG";

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// Location of the vehicle dataset.
#[derive(Debug, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

fn default_dataset_path() -> String {
    "data/vehicles.csv".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

impl Config {
    /// Load config from `$VMATCH_CONFIG` or ~/.config/vmatch/config.toml, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let contents = std::fs::read_to_string(&path)?;
            return Self::parse(&contents)
                .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()));
        }

        Ok(Config::default())
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `toml::de::Error` if the text is not valid TOML or has the wrong shape.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "vmatch").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The configured dataset path with `~` expanded.
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        expand_tilde(&self.dataset.path)
    }
}

/// Expand ~ to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
