//! Configuration loader for herald
//!
//! This module provides the `ConfigLoader` struct that layers an optional
//! TOML file under `HERALD_*` environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for the configuration file
const CONFIG_FILE_ENV: &str = "HERALD_CONFIG_FILE";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "HERALD";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader
///
/// Sources, lowest priority first:
/// 1. Built-in defaults
/// 2. The TOML file (explicit path, or `HERALD_CONFIG_FILE`)
/// 3. `HERALD_*` environment variables
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Configuration file path, if any
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that reads `HERALD_CONFIG_FILE` to find its file
    pub fn new() -> Self {
        Self {
            config_file: std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from),
        }
    }

    /// Create a loader for an explicit file; the file must exist
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_file: Some(path.into()),
        }
    }

    /// Get the configuration file path
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the configured file does not exist
    /// - configuration parsing fails
    /// - configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Build the config::Config instance from all sources
    fn build_config(&self) -> Result<Config, ConfigError> {
        let mut builder = Config::builder();

        if let Some(ref config_file) = self.config_file {
            if !config_file.exists() {
                return Err(ConfigError::file_not_found(format!(
                    "Required configuration file not found: {}",
                    config_file.display()
                )));
            }

            builder = builder.add_source(
                File::new(config_file.to_str().unwrap_or_default(), FileFormat::Toml).required(true),
            );
        }

        // Environment variables are lowercased and split on `__`:
        // HERALD_ASSET__APP_ID -> asset.app_id
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        );

        builder.build().map_err(ConfigError::from)
    }
}
