//! Error types for configuration loading and resolution.

use std::path::PathBuf;
use thiserror::Error;

use crate::dynamic::FetchError;

/// Errors surfaced while building configuration.
///
/// Every variant is fatal: they are raised at construction time so a service
/// with a broken configuration setup fails at startup instead of degrading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key is absent from every layer consulted.
    #[error("missing required configuration key '{0}'")]
    Missing(String),

    /// A key exists but its value cannot be read as the requested type.
    #[error("configuration key '{key}' has value '{value}' which is not a valid {expected}")]
    WrongType {
        key: String,
        value: String,
        expected: &'static str,
    },

    /// The remote snapshot location does not parse as a URL.
    #[error("configuration key '{key}' is not a valid URL '{value}': {source}")]
    InvalidUrl {
        key: String,
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// Polling interval must be strictly positive.
    #[error("configuration key '{0}' must be a positive duration")]
    InvalidInterval(String),

    /// A composite already holds a layer with this name.
    #[error("layer '{0}' already exists in composite")]
    DuplicateLayer(String),

    /// A config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The blocking first fetch failed while `sync-init` was requested.
    #[error("synchronous initial fetch of dynamic configuration failed: {0}")]
    SyncInit(#[source] FetchError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
