//! Configuration File Loading
//!
//! Handles loading and saving the TOML configuration file from standard
//! locations with fallback to built-in defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use crate::error::{Error, Result};

/// Configuration file loader
pub struct ConfigLoader {
    /// Search paths for configuration files, in order of preference
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader with the standard search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
        }
    }

    /// Load configuration from the first file found in the search paths.
    /// Returns `ConfigNotFound` when no file exists anywhere.
    pub fn load() -> Result<Config> {
        let loader = Self::new();

        for path in &loader.search_paths {
            if path.exists() {
                debug!("Loading configuration from {}", path.display());
                return Self::load_from_file(path);
            }
        }

        Err(Error::ConfigNotFound)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
            reason: e.to_string(),
        })?;

        config.validate().map_err(|e| Error::ConfigParseFailed {
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save configuration to the default location, creating directories as
    /// needed. Returns the path written.
    pub fn save(config: &Config) -> Result<PathBuf> {
        let path = Self::default_config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ConfigSaveFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| Error::ConfigSaveFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        fs::write(&path, content).map_err(|e| Error::ConfigSaveFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!("Configuration saved to {}", path.display());
        Ok(path)
    }

    /// The path new configurations are saved to
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scriptdeck")
            .join("config.toml")
    }

    /// Configuration file locations in order of preference
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Explicit override via environment
        if let Ok(path) = env::var("SCRIPTDECK_CONFIG") {
            paths.push(PathBuf::from(path));
        }

        // 2. XDG / platform config dir
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("scriptdeck").join("config.toml"));
        }

        // 3. Dotfile in the home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".scriptdeck").join("config.toml"));
        }

        // 4. Current working directory
        paths.push(PathBuf::from("scriptdeck.toml"));

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
