//! Config resolver
//!
//! Picks the backend for each lookup: the config service when it answers the
//! availability probe, the local files otherwise. The choice is made fresh on
//! every call and never mixes values from both backends.

use std::fmt;

use crate::config::document::ConfigMap;
use crate::config::file_store::FileStore;
use crate::config::name::ConfigName;
use crate::config::remote::RemoteConfigClient;
use crate::error::ConfigError;

/// The backend serving a single lookup
#[derive(Debug, Clone, Copy)]
pub enum Backend<'a> {
    Remote(&'a RemoteConfigClient),
    File(&'a FileStore),
}

impl Backend<'_> {
    pub fn get_config(&self, name: &str) -> Result<ConfigMap, ConfigError> {
        match self {
            Backend::Remote(client) => client.get_config(name),
            Backend::File(store) => store.get_config(name),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Backend::Remote(_))
    }
}

impl fmt::Display for Backend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Remote(client) => write!(f, "remote ({})", client.endpoint()),
            Backend::File(store) => write!(f, "file ({})", store.root_folder().display()),
        }
    }
}

/// Resolves config names against the service or the local files
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    remote: RemoteConfigClient,
    files: FileStore,
}

impl ConfigResolver {
    pub fn new(remote: RemoteConfigClient, files: FileStore) -> Self {
        Self { remote, files }
    }

    /// Resolver built from the current environment settings
    pub fn from_env() -> Self {
        Self::new(RemoteConfigClient::from_env(), FileStore::from_env())
    }

    pub fn remote(&self) -> &RemoteConfigClient {
        &self.remote
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// Probe the service and pick the backend for one lookup
    pub fn select_backend(&self) -> Backend<'_> {
        if self.remote.is_available() {
            Backend::Remote(&self.remote)
        } else {
            Backend::File(&self.files)
        }
    }

    /// Get a config's `config` mapping from whichever backend is available
    pub fn get_config(&self, name: &str) -> Result<ConfigMap, ConfigError> {
        let config_name = ConfigName::parse(name)?;
        let backend = self.select_backend();

        tracing::debug!(config = %config_name, backend = %backend, "Resolving config");

        backend.get_config(config_name.as_str())
    }
}

/// Get a config, from the config service if available or else from file
///
/// Settings are read from the environment on every call.
pub fn get_config(name: &str) -> Result<ConfigMap, ConfigError> {
    ConfigResolver::from_env().get_config(name)
}
