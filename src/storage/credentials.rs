//! Object-storage credentials
//!
//! Credentials are never configured directly; they are read from a named
//! config resolved through [`crate::config::get_config`].

use std::fmt;

use serde_json::Value;

use crate::config::{self, settings, ConfigMap};
use crate::error::StorageError;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Access credentials and endpoint of an S3-compatible service
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint_url: String,
    pub region: String,
}

impl StorageCredentials {
    /// Build credentials from a resolved config mapping
    ///
    /// Requires `access_key`, `secret_key` and `url`; `region` is optional.
    pub fn from_config(config: &ConfigMap) -> Result<Self, StorageError> {
        Ok(Self {
            access_key: required(config, "access_key")?,
            secret_key: required(config, "secret_key")?,
            endpoint_url: required(config, "url")?,
            region: config
                .get("region")
                .and_then(Value::as_str)
                .filter(|region| !region.is_empty())
                .unwrap_or(DEFAULT_REGION)
                .to_string(),
        })
    }

    /// Resolve credentials from the named config
    pub fn resolve(config_name: &str) -> Result<Self, StorageError> {
        let config = config::get_config(config_name)?;
        Self::from_config(&config)
    }

    /// Resolve credentials from the config named by `TFDS_S3_CONFIG`
    pub fn from_env() -> Result<Self, StorageError> {
        Self::resolve(&settings::storage_config_name())
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .finish()
    }
}

fn required(config: &ConfigMap, key: &str) -> Result<String, StorageError> {
    config
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StorageError::MissingCredential(key.to_string()))
}
