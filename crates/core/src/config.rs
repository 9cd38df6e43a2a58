//! Storage configuration via `wsmodel.toml`
//!
//! All settings have defaults, so an empty file (or no file) is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "wsmodel.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Storage configuration loaded from `wsmodel.toml`.
///
/// # Example
///
/// ```toml
/// check_references = true
/// change_log = true
/// max_cascade_depth = 64
/// log_level = "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Validate reference targets on add and modify.
    #[serde(default = "default_true")]
    pub check_references: bool,
    /// Record entity changes for `collect_changes`.
    #[serde(default = "default_true")]
    pub change_log: bool,
    /// Deepest cascade a removal may follow before it is rejected.
    #[serde(default = "default_max_cascade_depth")]
    pub max_cascade_depth: usize,
    /// Log level for `wsmodel::logging::init`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_max_cascade_depth() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            check_references: true,
            change_log: true,
            max_cascade_depth: default_max_cascade_depth(),
            log_level: default_log_level(),
        }
    }
}

impl StorageConfig {
    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero cascade depth or an unknown log level.
    pub fn validate(&self) -> Result<()> {
        if self.max_cascade_depth == 0 {
            return Err(Error::Config(
                "max_cascade_depth must be at least 1".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log_level '{}'. Expected one of {:?}.",
                self.log_level, LOG_LEVELS
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# wsmodel storage configuration
#
# Validate that references point at existing entities of the right kind
check_references = true

# Record added/modified/removed entities for collect_changes()
change_log = true

# Removals cascading deeper than this are rejected
max_cascade_depth = 64

# trace | debug | info | warn | error
log_level = "info"
"#
    }

    /// Parse and validate config text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: StorageConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = StorageConfig::default();
        assert!(config.check_references);
        assert!(config.change_log);
        assert_eq!(config.max_cascade_depth, 64);
        config.validate().unwrap();
    }

    #[test]
    fn default_toml_matches_default() {
        let parsed = StorageConfig::from_toml_str(StorageConfig::default_toml()).unwrap();
        assert_eq!(parsed, StorageConfig::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed = StorageConfig::from_toml_str("").unwrap();
        assert_eq!(parsed, StorageConfig::default());
    }

    #[test]
    fn partial_file_overrides() {
        let parsed = StorageConfig::from_toml_str("change_log = false").unwrap();
        assert!(!parsed.change_log);
        assert!(parsed.check_references);
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err = StorageConfig::from_toml_str("log_level = \"loud\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn zero_cascade_depth_rejected() {
        assert!(StorageConfig::from_toml_str("max_cascade_depth = 0").is_err());
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(StorageConfig::from_toml_str("check_references = ").is_err());
    }

    #[test]
    fn write_default_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        StorageConfig::write_default_if_missing(&path).unwrap();
        assert!(path.exists());
        let config = StorageConfig::from_file(&path).unwrap();
        assert_eq!(config, StorageConfig::default());
    }

    #[test]
    fn write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "change_log = false\n").unwrap();
        StorageConfig::write_default_if_missing(&path).unwrap();
        assert!(!StorageConfig::from_file(&path).unwrap().change_log);
    }

    #[test]
    fn write_to_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = StorageConfig {
            check_references: false,
            change_log: true,
            max_cascade_depth: 8,
            log_level: "debug".to_string(),
        };
        config.write_to_file(&path).unwrap();
        assert_eq!(StorageConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = StorageConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
