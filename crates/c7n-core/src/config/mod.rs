//! Configuration types for the policy builder.
//!
//! Configuration is loaded from a YAML file (`c7n-builder.yaml` by convention).
//! Every field has a default, so an empty file, or no file at all, yields a
//! usable configuration.
//!
//! ```yaml
//! catalog:
//!   schema: data/c7n-schema.json
//!   docs: data/c7n-docs.json
//! output:
//!   format: json
//! logging:
//!   level: debug
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::OutputFormat;

/// Conventional configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "c7n-builder.yaml";

/// Complete builder configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Where the reference catalog is read from.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Rendering settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Location of the schema catalog and its documentation companion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the JSON-Schema catalog.
    #[serde(default = "default_schema_path")]
    pub schema: PathBuf,

    /// Path to the documentation catalog (optional).
    #[serde(default)]
    pub docs: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            schema: default_schema_path(),
            docs: None,
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Encoding used when a command does not ask for one.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("c7n-schema.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BuilderConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration and resolve catalog paths relative to the file.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        config.catalog.schema = resolve_relative(&base_dir, &config.catalog.schema);
        config.catalog.docs = config
            .catalog
            .docs
            .as_ref()
            .map(|docs| resolve_relative(&base_dir, docs));

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.schema.as_os_str().is_empty() {
            return Err(ConfigError::Config(
                "catalog.schema must not be empty".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Config(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_relative(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
