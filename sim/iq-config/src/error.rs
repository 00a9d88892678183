//! Error types for configuration loading.

use thiserror::Error;

/// Errors that can occur while loading configuration documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The file being read.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A value could not be interpreted as the expected type.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The document was structurally empty.
    #[error("empty document: {context}")]
    EmptyDocument {
        /// What was being loaded.
        context: String,
    },
}

impl ConfigError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an empty-document error.
    pub fn empty(context: impl Into<String>) -> Self {
        Self::EmptyDocument {
            context: context.into(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
