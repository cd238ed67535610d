//! Configuration settings structures for herald
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_id() -> String {
    "Herald".to_string()
}

fn default_app_desc() -> String {
    "Herald Notifications".to_string()
}

fn default_storage_idlen() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/herald.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Asset
// ============================================================================

/// Digest used for `url_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlIdHash {
    #[default]
    Sha256,
    Sha512,
}

impl UrlIdHash {
    /// Length of the hex digest
    pub fn hex_len(&self) -> usize {
        match self {
            UrlIdHash::Sha256 => 64,
            UrlIdHash::Sha512 => 128,
        }
    }
}

/// Application identity handed to every handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Identifies the application to remote services (HTTP `User-Agent`)
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Fallback title for handlers that insist on one
    #[serde(default = "default_app_desc")]
    pub app_desc: String,

    /// Home page of the embedding application, empty when unset
    #[serde(default)]
    pub app_url: String,

    /// Prefixed to every `url_id` hash
    #[serde(default)]
    pub storage_salt: String,

    /// Truncation of `url_id` digests; 0 keeps the full digest
    #[serde(default = "default_storage_idlen")]
    pub storage_idlen: usize,

    #[serde(default)]
    pub url_id_hash: UrlIdHash,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            app_desc: default_app_desc(),
            app_url: String::new(),
            storage_salt: String::new(),
            storage_idlen: default_storage_idlen(),
            url_id_hash: UrlIdHash::default(),
        }
    }
}

// ============================================================================
// Logger Settings (converted into LoggerConfig)
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to the runtime LoggerConfig
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            }
        })
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Application identity
    #[serde(default)]
    pub asset: Asset,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_asset_defaults() {
        let asset = Asset::default();
        assert_eq!(asset.app_id, "Herald");
        assert_eq!(asset.app_desc, "Herald Notifications");
        assert_eq!(asset.storage_idlen, 8);
        assert_eq!(asset.url_id_hash, UrlIdHash::Sha256);
        assert!(asset.storage_salt.is_empty());
    }

    #[test]
    fn test_asset_from_partial_document() {
        let asset: Asset = serde_json::from_str(r#"{"app_id": "MyApp", "url_id_hash": "sha512"}"#).unwrap();
        assert_eq!(asset.app_id, "MyApp");
        assert_eq!(asset.app_desc, "Herald Notifications");
        assert_eq!(asset.url_id_hash, UrlIdHash::Sha512);
    }

    #[test]
    fn test_logger_settings_conversion() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            file: FileSettings {
                enabled: true,
                format: "compact".to_string(),
                ..FileSettings::default()
            },
            ..LoggerSettings::default()
        };

        let config = settings.into_logger_config().unwrap();
        assert_eq!(config.level, "debug");
        assert!(config.file.enabled);
        assert_eq!(config.file.format, LogFormat::Compact);
    }

    #[test]
    fn test_invalid_file_format() {
        let settings = FileSettings {
            format: "xml".to_string(),
            ..FileSettings::default()
        };
        let err = settings.into_file_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "logger.file.format")
        );
    }

    fn arb_asset() -> impl Strategy<Value = Asset> {
        (
            "[A-Za-z][A-Za-z0-9 ]{0,20}",
            "[a-z0-9]{0,16}",
            0usize..=128usize,
            prop_oneof![Just(UrlIdHash::Sha256), Just(UrlIdHash::Sha512)],
        )
            .prop_map(|(app_id, storage_salt, storage_idlen, url_id_hash)| Asset {
                app_id,
                storage_salt,
                storage_idlen,
                url_id_hash,
                ..Asset::default()
            })
    }

    proptest! {
        #[test]
        fn prop_settings_serde_round_trip(asset in arb_asset()) {
            let settings = Settings { asset, logger: LoggerSettings::default() };
            let json = serde_json::to_string(&settings).unwrap();
            let restored: Settings = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(restored, settings);
        }
    }
}
