//! Config documents
//!
//! A document is the unit stored on disk and served by the config service:
//! a required `config` mapping, optional `meta`, and any other top-level keys
//! kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// The flat key/value payload callers receive from `get_config`
pub type ConfigMap = Map<String, Value>;

/// A validated config document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub config: ConfigMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigDocument {
    /// Create a document holding only a config payload
    pub fn new(config: ConfigMap) -> Self {
        Self {
            config,
            meta: None,
            extra: Map::new(),
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Validate a parsed value and turn it into a document
    ///
    /// `origin` names where the value came from and ends up in error messages.
    pub fn from_value(name: &str, origin: &str, value: Value) -> Result<Self, ConfigError> {
        if is_falsy(&value) {
            return Err(ConfigError::malformed(
                name,
                format!("{} is empty or invalid", origin),
            ));
        }
        let Value::Object(mut fields) = value else {
            return Err(ConfigError::malformed(
                name,
                format!("{} is not a mapping", origin),
            ));
        };

        let config = take_config(name, origin, &mut fields)?;
        let meta = fields.remove("meta");

        Ok(Self {
            config,
            meta,
            extra: fields,
        })
    }

    /// The same document without its `meta` key, as persisted
    pub fn without_meta(&self) -> Self {
        Self {
            config: self.config.clone(),
            meta: None,
            extra: self.extra.clone(),
        }
    }

    /// Metadata, or `None` when absent or falsy
    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref().filter(|meta| !is_falsy(meta))
    }
}

/// Pull a mapping `config` out of a decoded document
pub(crate) fn extract_config(name: &str, document: &Value) -> Result<ConfigMap, ConfigError> {
    match document.get("config") {
        None | Some(Value::Null) => Err(ConfigError::malformed(
            name,
            format!("document does not have a 'config' key. Got json: {}", document),
        )),
        Some(Value::Object(config)) => Ok(config.clone()),
        Some(other) => Err(ConfigError::malformed(
            name,
            format!("'config' must be a mapping, got: {}", other),
        )),
    }
}

/// Pull `meta` out of a decoded document, treating falsy values as absent
pub(crate) fn extract_meta(document: &Value) -> Option<Value> {
    document.get("meta").filter(|meta| !is_falsy(meta)).cloned()
}

fn take_config(
    name: &str,
    origin: &str,
    fields: &mut Map<String, Value>,
) -> Result<ConfigMap, ConfigError> {
    match fields.remove("config") {
        None | Some(Value::Null) => Err(ConfigError::malformed(
            name,
            format!("{} does not have a 'config' key", origin),
        )),
        Some(Value::Object(config)) => Ok(config),
        Some(other) => Err(ConfigError::malformed(
            name,
            format!("'config' in {} must be a mapping, got: {}", origin, other),
        )),
    }
}

/// Null, false, zero and empty containers/strings count as "no value"
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
