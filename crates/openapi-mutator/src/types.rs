//! Shared constants and the server entry type

use serde_yaml::{Mapping, Value};

/// Where the document is downloaded from when `SOURCE_URL` is unset
pub const DEFAULT_SOURCE_URL: &str = "https://smpte.github.io/st2138-a/docs/openapi.yaml";

/// Where the document is written when `OUTPUT_PATH` is unset
pub const DEFAULT_OUTPUT_PATH: &str = "/usr/share/nginx/html/openapi.yaml";

/// Seconds allowed for the download
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Server URL that never survives into the output
pub const BLOCKED_SERVER_URL: &str = "https://device.catenamedia.tv:443/st2138-api/v1";

/// Name of the injected bearer security scheme
pub const BEARER_SCHEME_NAME: &str = "BearerAuth";

/// One entry of the document's `servers` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEntry {
    /// Base URL, unique within a list
    pub url: String,
    /// Human readable description (may be empty)
    pub description: String,
}

impl ServerEntry {
    pub fn new(url: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: description.into(),
        }
    }

    /// Render as a `{url, description}` mapping for the document tree
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert(Value::from("url"), Value::from(self.url.as_str()));
        map.insert(
            Value::from("description"),
            Value::from(self.description.as_str()),
        );
        Value::Mapping(map)
    }
}

/// Read the `url` of a server entry, if it is a mapping with a non-empty string url
pub(crate) fn server_url(entry: &Value) -> Option<&str> {
    entry
        .as_mapping()?
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}
