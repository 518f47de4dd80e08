//! Error types for reprobe
//!
//! All modules use `ReprobeResult<T>` as their return type. Ordinary
//! resolution failures (not found, transport errors, unresolved
//! coordinates) are values, not errors; only programmer errors and
//! environment failures end up here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for reprobe operations
pub type ReprobeResult<T> = Result<T, ReprobeError>;

/// All errors that can occur in reprobe
#[derive(Error, Debug)]
pub enum ReprobeError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Input errors
    #[error("Invalid coordinate '{input}': {reason}")]
    InvalidCoordinate { input: String, reason: String },

    #[error("Invalid repository '{input}': {reason}")]
    InvalidRepository { input: String, reason: String },

    #[error("Invalid update policy '{0}'")]
    InvalidUpdatePolicy(String),

    #[error("No repositories configured")]
    NoRepositories,

    #[error("Duplicate repository id: {0}")]
    DuplicateRepository(String),

    // Cache errors
    #[error("Cache corruption: record for {found} read back under key {expected}")]
    CacheCorruption { expected: String, found: String },

    // Runtime errors
    #[error("Resolution task failed: {0}")]
    TaskFailed(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl ReprobeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid coordinate error
    pub fn coordinate(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid repository error
    pub fn repository(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRepository {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoRepositories => {
                Some("Pass --repo id=location or add [[repositories]] to the config file")
            }
            Self::InvalidCoordinate { .. } => {
                Some("Use group:artifact:version or group:artifact:type:version")
            }
            Self::InvalidUpdatePolicy(_) => {
                Some("Valid policies: always, daily, never, interval:<minutes>")
            }
            Self::InvalidRepository { .. } => Some("Use id=location or id=location@policy"),
            _ => None,
        }
    }
}
