//! File-backed config store
//!
//! Configs live as YAML documents under a root folder split into two
//! partitions, `secrets/` and `config/`. Lookups search `secrets/` first.

use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::document::{ConfigDocument, ConfigMap};
use crate::config::name::{has_yaml_extension, strip_extension, ConfigName};
use crate::config::settings;
use crate::error::ConfigError;

/// Storage partition under the root folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLocation {
    Secrets,
    Config,
}

impl StorageLocation {
    /// Partitions in lookup order; secrets take precedence
    pub const SEARCH_ORDER: [StorageLocation; 2] =
        [StorageLocation::Secrets, StorageLocation::Config];

    pub fn dir_name(&self) -> &'static str {
        match self {
            StorageLocation::Secrets => "secrets",
            StorageLocation::Config => "config",
        }
    }
}

/// Result of a delete call; a missing file is reported, not raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(PathBuf),
    NotFound(PathBuf),
}

/// Reads and writes config documents below a root folder
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `TFDS_ROOT_PATH`, read now
    pub fn from_env() -> Self {
        Self::new(settings::root_folder())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root
    }

    fn partition_path(&self, location: StorageLocation, name: &ConfigName) -> PathBuf {
        self.root.join(location.dir_name()).join(name.file_name())
    }

    fn path_for(&self, name: &ConfigName) -> PathBuf {
        let secret = self.partition_path(StorageLocation::Secrets, name);
        if secret.is_file() {
            return secret;
        }
        // Fallback candidate, existence is checked by the caller
        self.partition_path(StorageLocation::Config, name)
    }

    /// Path a config name resolves to
    ///
    /// Returns the secrets path when that file exists, otherwise the config
    /// partition path whether or not it exists.
    pub fn resolve_path(&self, name: &str) -> Result<PathBuf, ConfigError> {
        let name = ConfigName::parse(name)?;
        Ok(self.path_for(&name))
    }

    /// Check if a config file exists
    pub fn exists(&self, name: &str) -> Result<bool, ConfigError> {
        Ok(self.resolve_path(name)?.is_file())
    }

    /// Read and validate a config document
    pub fn read_document(&self, name: &str) -> Result<ConfigDocument, ConfigError> {
        let config_name = ConfigName::parse(name)?;
        let path = self.path_for(&config_name);
        if !path.is_file() {
            return Err(ConfigError::not_found(
                config_name.as_str(),
                format!(
                    "not found in config nor secrets under {}",
                    self.root.display()
                ),
            ));
        }

        let contents = fs::read_to_string(&path).map_err(|e| ConfigError::io(&path, e))?;
        let origin = path.display().to_string();
        if contents.trim().is_empty() {
            return Err(ConfigError::malformed(
                config_name.as_str(),
                format!("{} is empty or invalid", origin),
            ));
        }

        let value: Value = serde_yaml::from_str(&contents).map_err(|e| {
            ConfigError::malformed(
                config_name.as_str(),
                format!("{} is not valid YAML: {}", origin, e),
            )
        })?;

        tracing::debug!(config = %config_name, path = %origin, "Read config file");

        ConfigDocument::from_value(config_name.as_str(), &origin, value)
    }

    /// Write a config document, dropping its `meta` key
    ///
    /// Parent folders are created as needed. The file is held under an
    /// exclusive advisory lock for the duration of the write.
    pub fn write_document(
        &self,
        name: &str,
        document: &ConfigDocument,
    ) -> Result<PathBuf, ConfigError> {
        let config_name = ConfigName::parse(name)?;
        let path = self.path_for(&config_name);

        let yaml = serde_yaml::to_string(&document.without_meta()).map_err(|e| {
            ConfigError::Serialize {
                name: config_name.to_string(),
                detail: e.to_string(),
            }
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| ConfigError::io(&path, e))?;

        file.lock().map_err(|e| ConfigError::io(&path, e))?;
        let written = write_locked(&mut file, yaml.as_bytes());
        let unlocked = file.unlock();
        written.map_err(|e| ConfigError::io(&path, e))?;
        unlocked.map_err(|e| ConfigError::io(&path, e))?;

        tracing::debug!(config = %config_name, path = %path.display(), "Wrote config file");

        Ok(path)
    }

    /// Delete a config file; a missing file is only reported
    pub fn delete(&self, name: &str) -> Result<DeleteOutcome, ConfigError> {
        let path = self.resolve_path(name)?;
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Configuration not found, nothing to delete");
            return Ok(DeleteOutcome::NotFound(path));
        }

        fs::remove_file(&path).map_err(|e| ConfigError::io(&path, e))?;
        tracing::info!(path = %path.display(), "Deleted configuration");
        Ok(DeleteOutcome::Deleted(path))
    }

    /// All config names available in both partitions
    pub fn list_names(&self) -> Result<BTreeSet<String>, ConfigError> {
        let mut names = BTreeSet::new();
        for location in StorageLocation::SEARCH_ORDER {
            let dir = self.root.join(location.dir_name());
            for file_name in list_files(&dir)? {
                if has_yaml_extension(&file_name) {
                    names.insert(strip_extension(&file_name).to_string());
                }
            }
        }
        Ok(names)
    }

    /// Read a config file and return its `config` mapping
    pub fn get_config(&self, name: &str) -> Result<ConfigMap, ConfigError> {
        Ok(self.read_document(name)?.config)
    }
}

fn write_locked(file: &mut File, contents: &[u8]) -> io::Result<()> {
    file.set_len(0)?;
    file.write_all(contents)?;
    file.flush()
}

/// Regular file names in a folder; a missing folder lists as empty
fn list_files(dir: &Path) -> Result<Vec<String>, ConfigError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ConfigError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::io(dir, e))?;
        if entry.path().is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(files)
}
