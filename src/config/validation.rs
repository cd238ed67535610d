//! Configuration validation logic
//!
//! This module provides validation methods for the configuration structures
//! to ensure values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{Asset, FileSettings, LoggerSettings, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl Asset {
    /// Validate the application identity
    ///
    /// # Validation Rules
    /// - `app_id` must not be blank (it is sent as the User-Agent)
    /// - `app_desc` must not be blank
    ///
    /// A `storage_idlen` longer than the digest is not an error: the digest
    /// is simply kept whole.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::validation(
                "asset.app_id",
                "Application id is required. It identifies requests to remote services.",
            ));
        }

        if self.app_desc.trim().is_empty() {
            return Err(ConfigError::validation(
                "asset.app_desc",
                "Application description must not be empty.",
            ));
        }

        Ok(())
    }

    /// `storage_idlen` clamped to the configured digest
    pub fn effective_idlen(&self) -> usize {
        let max = self.url_id_hash.hex_len();
        match self.storage_idlen {
            0 => max,
            len => len.min(max),
        }
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    /// - At least one output must be enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.asset.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
