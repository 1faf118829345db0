//! Configuration file loading
//!
//! Handles loading configuration from TOML files.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

const APP_DIR: &str = "kube-event-relay";

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the first readable default location
    pub fn load_default() -> Option<Config> {
        for path in Self::default_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return Some(config);
                }
                Err(e) => log::warn!("Ignoring config {}: {}", path.display(), e),
            }
        }
        None
    }

    /// Default configuration file paths, lowest precedence first
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory
        paths.push(PathBuf::from(format!("{APP_DIR}.toml")));

        // User config
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_DIR).join("config.toml"));
        }

        // System-wide config
        paths.push(PathBuf::from(format!("/etc/{APP_DIR}/config.toml")));

        paths
    }
}
