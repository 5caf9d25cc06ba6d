//! Error types for the updater

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Exit code for unusable command-line flags or environment values that the
/// argument parser rejects before any [`UpdateError`] can occur. Kept apart
/// from the codes returned by [`UpdateError::exit_code`].
pub const USAGE_EXIT_CODE: u8 = 64;

/// Updater error types
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("network error fetching spec: {0}")]
    FetchError(String),

    #[error("unexpected status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("YAML parse failed: {0}")]
    YamlError(#[source] serde_yaml::Error),

    #[error("JSON parse failed: {0}")]
    JsonError(#[source] serde_json::Error),

    #[error("Invalid OpenAPI spec format: {0}")]
    InvalidFormat(String),

    #[error("{var} invalid JSON: {source}")]
    InvalidServerJson {
        var: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} must be a JSON array")]
    ServerListNotArray(String),

    #[error("YAML serialization failed: {0}")]
    SerializeError(#[source] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl UpdateError {
    /// Process exit code reported for this failure.
    ///
    /// `1` covers the download and anything that fails after mutation,
    /// `2` an undecodable document, `3` a malformed server list variable.
    pub fn exit_code(&self) -> u8 {
        match self {
            UpdateError::FetchError(_)
            | UpdateError::HttpStatus { .. }
            | UpdateError::InvalidUrl(_) => 1,
            UpdateError::YamlError(_)
            | UpdateError::JsonError(_)
            | UpdateError::InvalidFormat(_) => 2,
            UpdateError::InvalidServerJson { .. } | UpdateError::ServerListNotArray(_) => 3,
            UpdateError::SerializeError(_) | UpdateError::IoError(_) => 1,
        }
    }
}
