use thiserror::Error;

/// Library-wide error type.
///
/// Only configuration-time failures travel through this type. Delivery
/// failures never do: `send` logs them and reports `false` instead.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The URL could not be broken apart by the grammar or the handler
    #[error("Unparseable URL: {url}")]
    UnparseableUrl { url: String },

    /// No handler is registered for the schema
    #[error("Unsupported schema: {schema}://")]
    UnsupportedSchema { schema: String },

    /// The URL parsed but is semantically invalid for the handler
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A handler's static schema description is inconsistent
    #[error("Registration of {schema}:// failed: {reason}")]
    Registration { schema: String, reason: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Network level failure inside a handler
    #[error("Transport error")]
    Transport {
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl NotifyError {
    /// Shorthand for a construction-time validation failure
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NotifyError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised while building a handler
    pub fn is_construction_error(&self) -> bool {
        matches!(self, NotifyError::Validation { .. })
    }
}

impl From<anyhow::Error> for NotifyError {
    fn from(error: anyhow::Error) -> Self {
        NotifyError::Internal { source: error }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(error: reqwest::Error) -> Self {
        NotifyError::Transport {
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with NotifyError to simplify function signatures
pub type NotifyResult<T> = Result<T, NotifyError>;
