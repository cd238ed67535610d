//! Small enums shared by every handler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyType {
    #[default]
    Info,
    Success,
    Warning,
    Failure,
}

impl NotifyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyType::Info => "info",
            NotifyType::Success => "success",
            NotifyType::Warning => "warning",
            NotifyType::Failure => "failure",
        }
    }
}

impl fmt::Display for NotifyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotifyType {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(NotifyType::Info),
            "success" => Ok(NotifyType::Success),
            "warning" => Ok(NotifyType::Warning),
            "failure" => Ok(NotifyType::Failure),
            _ => Err(NotifyError::validation(
                "type",
                format!("Invalid notification type '{}'. Valid types are: info, success, warning, failure", s),
            )),
        }
    }
}

/// Markup of the message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyFormat {
    #[default]
    Text,
    Html,
    Markdown,
}

impl NotifyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyFormat::Text => "text",
            NotifyFormat::Html => "html",
            NotifyFormat::Markdown => "markdown",
        }
    }
}

impl fmt::Display for NotifyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotifyFormat {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(NotifyFormat::Text),
            "html" => Ok(NotifyFormat::Html),
            "markdown" => Ok(NotifyFormat::Markdown),
            _ => Err(NotifyError::validation(
                "format",
                format!("Invalid notify format '{}'. Valid formats are: text, html, markdown", s),
            )),
        }
    }
}

/// What to do with a message larger than the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowMode {
    /// Hand the message over untouched and let the service decide
    #[default]
    Upstream,
    /// Cut the body at the limit
    Truncate,
    /// Send the body as several messages
    Split,
}

impl OverflowMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowMode::Upstream => "upstream",
            OverflowMode::Truncate => "truncate",
            OverflowMode::Split => "split",
        }
    }
}

impl fmt::Display for OverflowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowMode {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upstream" => Ok(OverflowMode::Upstream),
            "truncate" => Ok(OverflowMode::Truncate),
            "split" => Ok(OverflowMode::Split),
            _ => Err(NotifyError::validation(
                "overflow",
                format!("Invalid overflow mode '{}'. Valid modes are: upstream, truncate, split", s),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" HTML ".parse::<NotifyFormat>().unwrap(), NotifyFormat::Html);
        assert_eq!("Split".parse::<OverflowMode>().unwrap(), OverflowMode::Split);
        assert_eq!("FAILURE".parse::<NotifyType>().unwrap(), NotifyType::Failure);
    }

    #[test]
    fn test_invalid_values_are_construction_errors() {
        let err = "rtf".parse::<NotifyFormat>().unwrap_err();
        assert!(err.is_construction_error());
        assert!("spill".parse::<OverflowMode>().is_err());
        assert!("".parse::<NotifyType>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(NotifyType::default(), NotifyType::Info);
        assert_eq!(NotifyFormat::default(), NotifyFormat::Text);
        assert_eq!(OverflowMode::default(), OverflowMode::Upstream);
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&NotifyType::Warning).unwrap(), "\"warning\"");
        let mode: OverflowMode = serde_json::from_str("\"truncate\"").unwrap();
        assert_eq!(mode, OverflowMode::Truncate);
    }
}
