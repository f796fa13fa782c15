//! Error handling for the lexget-cli application
//!
//! Errors are layered the same way the lookup flows: storage problems are
//! `CacheError`, transport problems are `NetworkError`, and everything a single
//! word lookup can run into is a `LookupError`. `LexGetError` is what `main`
//! returns when the process itself cannot continue.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexGetError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Cache query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("Cache migration failed: {0}")]
    Migration(String),

    #[error("Cache directory could not be created: {0}")]
    Directory(#[source] std::io::Error),

    #[error("No cached entry for \"{word}\" from {source_name}")]
    NotFound { source_name: String, word: String },

    #[error("Cached entry for \"{word}\" from {source_name} is unreadable: {reason}")]
    Corrupt {
        source_name: String,
        word: String,
        reason: String,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Database corruption detected")]
    Corruption,
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Unknown dictionary: {name}")]
    UnknownDictionary { name: String },
}

/// Everything that can go wrong while looking up one word.
///
/// None of these stop a multi-word batch; the pipeline reports them and moves
/// on to the next word.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No entry found for \"{word}\"")]
    NotFound { word: String },

    #[error("Query for \"{word}\" timed out after {:.1}s", .after.as_secs_f64())]
    Timeout { word: String, after: Duration },

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("{provider} returned an unexpected response: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl LookupError {
    pub fn provider(provider: &str, reason: impl Into<String>) -> Self {
        LookupError::Provider {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Short label used in log fields and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::NotFound { .. } => "not_found",
            LookupError::Timeout { .. } => "timeout",
            LookupError::Network(_) => "network",
            LookupError::Provider { .. } => "provider",
            LookupError::InvalidRecord(_) => "invalid_record",
        }
    }
}

pub type Result<T> = std::result::Result<T, LexGetError>;

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(
                ffi::Error {
                    code: ffi::ErrorCode::DatabaseCorrupt,
                    ..
                },
                _,
            ) => CacheError::Corruption,
            _ => CacheError::Query(err),
        }
    }
}

use rusqlite::ffi;

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err)
    }
}

impl From<toml::de::Error> for LexGetError {
    fn from(err: toml::de::Error) -> Self {
        LexGetError::Config(ConfigError::InvalidFormat(err))
    }
}
