//! Configuration resolution
//!
//! This module resolves named configurations either from the TFDS config
//! service or from YAML files on the local filesystem, and returns the
//! `config` mapping of the resolved document.

pub mod document;
pub mod file_store;
pub mod name;
pub mod remote;
pub mod resolver;
pub mod settings;

pub use document::{ConfigDocument, ConfigMap};
pub use file_store::{DeleteOutcome, FileStore, StorageLocation};
pub use name::{strip_extension, ConfigName};
pub use remote::RemoteConfigClient;
pub use resolver::{get_config, Backend, ConfigResolver};
pub use settings::Settings;
