//! Remote config client
//!
//! Talks to the TFDS config service over HTTP:
//! - `HEAD <endpoint>` answers whether the service is up
//! - `GET <endpoint>/<name>` returns `{"config": {...}, "meta": {...}}`
//! - `PUT <endpoint>/<name>` stores a document

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::config::document::{extract_config, extract_meta, ConfigDocument, ConfigMap};
use crate::config::name::ConfigName;
use crate::config::settings;
use crate::error::ConfigError;

/// Blocking client for the config service
#[derive(Debug, Clone)]
pub struct RemoteConfigClient {
    client: Client,
    endpoint: String,
}

impl RemoteConfigClient {
    /// Create a client against an explicit endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Client against `TFDS_CONFIG_URL`, read now
    pub fn from_env() -> Self {
        Self::new(settings::config_url())
    }

    /// Configured service base address
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `<endpoint>/<name>`, with the name percent-encoded as one path segment
    fn document_url(&self, name: &ConfigName) -> Result<Url, ConfigError> {
        let invalid = |detail: String| {
            ConfigError::InvalidArgument(format!(
                "config service endpoint '{}' {}",
                self.endpoint, detail
            ))
        };
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| invalid(format!("is not a valid URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(name.as_str());
        Ok(url)
    }

    /// Check if the config service is reachable
    ///
    /// Never fails: any transport error counts as unavailable.
    pub fn is_available(&self) -> bool {
        match self.client.head(&self.endpoint).send() {
            Ok(response) => {
                let available = response.status() == StatusCode::OK;
                tracing::debug!(
                    endpoint = %self.endpoint,
                    status = %response.status(),
                    available,
                    "Config service probe"
                );
                available
            }
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, error = %e, "Config service unreachable");
                false
            }
        }
    }

    /// Fetch the full decoded document for a config
    pub fn fetch_document(&self, name: &str) -> Result<Value, ConfigError> {
        let config_name = ConfigName::parse(name)?;
        let url = self.document_url(&config_name)?;

        tracing::debug!(config = %config_name, url = %url, "Fetching config from service");

        let transport = |source| ConfigError::Transport {
            name: config_name.to_string(),
            source,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(transport)?;
        let text = response.text().map_err(transport)?;

        if text.trim().is_empty() {
            return Err(ConfigError::not_found(
                config_name.as_str(),
                "config server response was empty",
            ));
        }

        let document: Value = serde_json::from_str(&text).map_err(|e| {
            ConfigError::malformed(
                config_name.as_str(),
                format!("config server returned invalid JSON ({}): {}", e, text),
            )
        })?;

        if document.is_null() {
            return Err(ConfigError::not_found(
                config_name.as_str(),
                format!("config server response: {}", text),
            ));
        }

        Ok(document)
    }

    /// Fetch a config and return its `config` mapping
    pub fn get_config(&self, name: &str) -> Result<ConfigMap, ConfigError> {
        let config_name = ConfigName::parse(name)?;
        let document = self.fetch_document(config_name.as_str())?;
        extract_config(config_name.as_str(), &document)
    }

    /// Fetch a config's metadata; `None` when it has none
    pub fn get_meta(&self, name: &str) -> Result<Option<Value>, ConfigError> {
        let document = self.fetch_document(name)?;
        Ok(extract_meta(&document))
    }

    /// Store a document on the config service, without its `meta` key
    pub fn put_document(&self, name: &str, document: &ConfigDocument) -> Result<(), ConfigError> {
        let config_name = ConfigName::parse(name)?;
        let url = self.document_url(&config_name)?;

        self.client
            .put(url.clone())
            .json(&document.without_meta())
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|source| ConfigError::Transport {
                name: config_name.to_string(),
                source,
            })?;

        tracing::debug!(config = %config_name, url = %url, "Stored config on service");
        Ok(())
    }
}
