//! Environment-derived settings
//!
//! Every accessor reads the process environment at call time. Nothing here is
//! memoized, so a changed variable takes effect on the next lookup.

use std::env;
use std::path::PathBuf;

/// Base URL of the remote config service
pub const CONFIG_URL_ENV: &str = "TFDS_CONFIG_URL";
pub const DEFAULT_CONFIG_URL: &str = "http://tfds-config:8005/api/configs";

/// Root folder holding the `config/` and `secrets/` partitions
pub const ROOT_PATH_ENV: &str = "TFDS_ROOT_PATH";
pub const DEFAULT_ROOT_PATH: &str = "/opt/tfds/";

/// Name of the config holding object-storage credentials
pub const STORAGE_CONFIG_ENV: &str = "TFDS_S3_CONFIG";
pub const DEFAULT_STORAGE_CONFIG: &str = "s3";

/// Log level applied to this crate's targets
pub const LOG_LEVEL_ENV: &str = "TFDS_LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// Snapshot of the environment settings taken for a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub config_url: String,
    pub root_folder: PathBuf,
    pub storage_config: String,
    pub log_level: String,
}

impl Settings {
    /// Read all settings from the environment right now
    pub fn from_env() -> Self {
        Self {
            config_url: config_url(),
            root_folder: root_folder(),
            storage_config: storage_config_name(),
            log_level: env_or_default(LOG_LEVEL_ENV, DEFAULT_LOG_LEVEL),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_url: DEFAULT_CONFIG_URL.to_string(),
            root_folder: PathBuf::from(DEFAULT_ROOT_PATH),
            storage_config: DEFAULT_STORAGE_CONFIG.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Config service base URL (`TFDS_CONFIG_URL`)
pub fn config_url() -> String {
    config_url_from(env::var(CONFIG_URL_ENV).ok())
}

/// Local config root (`TFDS_ROOT_PATH`)
pub fn root_folder() -> PathBuf {
    root_folder_from(env::var(ROOT_PATH_ENV).ok())
}

/// Config name holding the object-storage credentials (`TFDS_S3_CONFIG`)
pub fn storage_config_name() -> String {
    env_or_default(STORAGE_CONFIG_ENV, DEFAULT_STORAGE_CONFIG)
}

fn config_url_from(value: Option<String>) -> String {
    value.unwrap_or_else(|| DEFAULT_CONFIG_URL.to_string())
}

fn root_folder_from(value: Option<String>) -> PathBuf {
    PathBuf::from(value.unwrap_or_else(|| DEFAULT_ROOT_PATH.to_string()))
}

/// Helper function to get environment variable with default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
