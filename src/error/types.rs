//! Library error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving, reading or writing a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config '{name}' not found: {detail}")]
    NotFound { name: String, detail: String },

    #[error("Config '{name}' is malformed: {detail}")]
    MalformedDocument { name: String, detail: String },

    #[error("Config server request for '{name}' failed: {source}")]
    Transport {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config '{name}': {detail}")]
    Serialize { name: String, detail: String },
}

impl ConfigError {
    pub(crate) fn not_found(name: &str, detail: impl Into<String>) -> Self {
        ConfigError::NotFound {
            name: name.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn malformed(name: &str, detail: impl Into<String>) -> Self {
        ConfigError::MalformedDocument {
            name: name.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the NotFound condition, on either backend
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }
}

/// Errors raised by the object-storage helpers
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage config is missing the '{0}' key")]
    MissingCredential(String),

    #[error("Object storage error: {0}")]
    Sdk(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Object store called from within an async runtime; use it from a blocking thread")]
    AsyncContext,
}

/// Errors raised while parsing scheduler execution dates
#[derive(Error, Debug)]
pub enum DateError {
    #[error("Invalid execution date '{input}': expected an ISO date or date-time")]
    Invalid { input: String },

    #[error("Date range of {length} days ending at {end} starts before the earliest supported date")]
    OutOfRange {
        end: chrono::NaiveDateTime,
        length: usize,
    },
}
