//! Run configuration
//!
//! The binary gathers raw strings (flags or environment variables) into
//! [`ConfigInputs`]. Converting them into an [`UpdateConfig`] decodes the
//! server lists and boolean switches once, up front, so the mutation stages
//! only ever see plain data.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, UpdateError};
use crate::security::SecurityOptions;
use crate::servers::ServerOverrides;
use crate::types::{
    ServerEntry, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_OUTPUT_PATH, DEFAULT_SOURCE_URL,
};

pub const SOURCE_URL_VAR: &str = "SOURCE_URL";
pub const OUTPUT_PATH_VAR: &str = "OUTPUT_PATH";
pub const FETCH_TIMEOUT_VAR: &str = "FETCH_TIMEOUT_SECS";
pub const REPLACE_SERVERS_VAR: &str = "ST2138_URLS";
pub const ADD_SERVERS_VAR: &str = "ST2138_ADD_URLS";
pub const REMOVE_SERVERS_VAR: &str = "ST2138_REMOVE_URLS";
pub const REMOVE_SECURITY_VAR: &str = "ST2138_REMOVE_SECURITY";
pub const ADD_BEARER_VAR: &str = "ST2138_ADD_BEARER";

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];

/// Raw, undecoded configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigInputs {
    pub source_url: Option<String>,
    pub output_path: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
    /// JSON array replacing the server list
    pub servers: Option<String>,
    /// JSON array appended to the server list
    pub add_servers: Option<String>,
    pub remove_servers: Option<String>,
    pub remove_security: Option<String>,
    pub add_bearer: Option<String>,
}

/// Fully decoded configuration for one run
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub source_url: String,
    pub output_path: PathBuf,
    pub fetch_timeout: Duration,
    pub servers: ServerOverrides,
    pub security: SecurityOptions,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            servers: ServerOverrides::default(),
            security: SecurityOptions::default(),
        }
    }
}

impl TryFrom<ConfigInputs> for UpdateConfig {
    type Error = UpdateError;

    fn try_from(inputs: ConfigInputs) -> Result<Self> {
        let replacement = decode_server_list(REPLACE_SERVERS_VAR, inputs.servers.as_deref())?;
        let additions = decode_server_list(ADD_SERVERS_VAR, inputs.add_servers.as_deref())?;

        let config = Self {
            source_url: inputs
                .source_url
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            output_path: inputs
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            fetch_timeout: Duration::from_secs(
                inputs.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
            servers: ServerOverrides {
                replacement,
                additions,
                clear_existing: is_truthy(inputs.remove_servers.as_deref()),
            },
            security: SecurityOptions {
                remove_existing: is_truthy(inputs.remove_security.as_deref()),
                add_bearer: is_truthy(inputs.add_bearer.as_deref()),
            },
        };

        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}

/// Interpret a switch value: `1`, `true`, `yes` or `on`, ignoring case and surrounding whitespace
pub fn is_truthy(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| TRUTHY.contains(&v.as_str()))
}

/// Decode a JSON array of `{url, name?, description?}` objects.
///
/// A missing or empty value is an empty list. Anything that is not valid
/// JSON, or not an array, is an error. Elements that are not objects or have
/// no usable `url` are skipped. The description comes from `name`, then
/// `description`, then falls back to an empty string.
pub fn decode_server_list(var: &str, raw: Option<&str>) -> Result<Vec<ServerEntry>> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(Vec::new()),
    };

    info!("Processing {} env", var);

    let parsed: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| UpdateError::InvalidServerJson {
            var: var.to_string(),
            source,
        })?;

    let entries = parsed
        .as_array()
        .ok_or_else(|| UpdateError::ServerListNotArray(var.to_string()))?;

    let mut servers = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(object) = entry.as_object() else {
            debug!("Skipping non-object entry in {}: {}", var, entry);
            continue;
        };

        let Some(url) = object
            .get("url")
            .and_then(serde_json::Value::as_str)
            .filter(|url| !url.is_empty())
        else {
            debug!("Skipping entry without url in {}: {}", var, entry);
            continue;
        };

        let description = ["name", "description"]
            .iter()
            .filter_map(|key| object.get(*key).and_then(serde_json::Value::as_str))
            .find(|text| !text.is_empty())
            .unwrap_or_default();

        info!(
            "Added server from {}: url={} description={}",
            var, url, description
        );
        servers.push(ServerEntry::new(url, description));
    }

    Ok(servers)
}
