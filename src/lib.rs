//! TFDS support library
//!
//! Config resolution against the TFDS config service or local YAML files,
//! object-storage helpers and compute session bootstrap.

// Public modules
pub mod compute;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::{
    get_config, ConfigDocument, ConfigMap, ConfigResolver, FileStore, RemoteConfigClient,
};
pub use error::{ConfigError, DateError, StorageError};
pub use storage::{ObjectStore, StorageCredentials};
