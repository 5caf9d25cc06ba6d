//! Decoded OpenAPI document

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{Result, UpdateError};

/// An OpenAPI document held as an order-preserving tree.
///
/// No schema is imposed: only the root is required to be a mapping. Keys
/// keep their insertion order through parsing, mutation and serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    root: Mapping,
}

impl Document {
    /// Parse a document from a string (auto-detects JSON/YAML)
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(UpdateError::InvalidFormat("document is empty".into()));
        }

        // Try JSON first, then YAML (flow-style YAML also starts with '{')
        let value: Value = if content.trim_start().starts_with('{') {
            match serde_json::from_str(content) {
                Ok(value) => value,
                Err(json_err) => {
                    debug!("Not valid JSON ({}), retrying as YAML", json_err);
                    serde_yaml::from_str(content).map_err(|_| UpdateError::JsonError(json_err))?
                }
            }
        } else {
            serde_yaml::from_str(content).map_err(UpdateError::YamlError)?
        };

        let document = Self::from_value(value)?;
        debug!("Parsed document with {} top-level keys", document.root.len());
        Ok(document)
    }

    /// Wrap an already decoded tree; the root must be a mapping
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Err(UpdateError::InvalidFormat("document is empty".into())),
            other => Err(UpdateError::InvalidFormat(format!(
                "expected a mapping at the document root, found {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Mapping {
        &mut self.root
    }

    /// Look up a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// The `servers` sequence, if present and well-formed
    pub fn servers(&self) -> Option<&Vec<Value>> {
        self.get("servers").and_then(Value::as_sequence)
    }

    /// Serialize to YAML, keeping key order
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(UpdateError::SerializeError)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
