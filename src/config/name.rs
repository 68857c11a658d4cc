//! Config names
//!
//! A config name may carry a cosmetic `.yaml`/`.yml` suffix, which is stripped
//! before any lookup.

use std::fmt;

use crate::error::ConfigError;

/// Extensions recognized on config files and names
pub const YAML_EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

/// Strip a trailing `.yaml` or `.yml` from a config name
///
/// Other suffixes pass through unchanged: `strip_extension("x.txt") == "x.txt"`.
pub fn strip_extension(name: &str) -> &str {
    YAML_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// True if a file name ends in a recognized YAML extension
pub fn has_yaml_extension(file_name: &str) -> bool {
    YAML_EXTENSIONS.iter().any(|ext| file_name.ends_with(ext))
}

/// A validated config name with the extension already stripped
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigName(String);

impl ConfigName {
    /// Validate and normalize a raw name
    ///
    /// Rejects empty names, names that are empty once the extension is
    /// stripped, and names containing a path separator.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Err(ConfigError::InvalidArgument(
                "A config name must be provided".to_string(),
            ));
        }

        let stripped = strip_extension(raw);
        if stripped.trim().is_empty() {
            return Err(ConfigError::InvalidArgument(format!(
                "Config name '{}' is empty once the extension is removed",
                raw
            )));
        }
        if stripped.contains(['/', '\\']) || stripped == "." || stripped == ".." {
            return Err(ConfigError::InvalidArgument(format!(
                "Config name '{}' must not contain path components",
                raw
            )));
        }

        Ok(Self(stripped.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name inside a storage partition
    pub fn file_name(&self) -> String {
        format!("{}.yaml", self.0)
    }
}

impl fmt::Display for ConfigName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConfigName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
