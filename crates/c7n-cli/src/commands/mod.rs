//! CLI command implementations for the policy builder.

pub mod catalog;
pub mod session;

use anyhow::{Context, Result};
use c7n_catalog::{DocsCatalog, SchemaCatalog};
use c7n_core::BuilderConfig;
use c7n_core::config::DEFAULT_CONFIG_FILE;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Load the configuration named by `--config`, else `c7n-builder.yaml` in
/// the working directory when present, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<BuilderConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(BuilderConfig::default());
            }
            default
        }
    };

    BuilderConfig::load_with_context(&path)
        .with_context(|| format!("Failed to load configuration from {:?}", path))
}

/// Catalogs loaded once per command.
pub struct Workspace {
    pub config: BuilderConfig,
    pub catalog: Arc<SchemaCatalog>,
    pub docs: Option<Arc<DocsCatalog>>,
}

impl Workspace {
    pub fn load(config: BuilderConfig) -> Result<Self> {
        let schema_path = &config.catalog.schema;
        let catalog = SchemaCatalog::from_file(schema_path)
            .with_context(|| format!("Failed to load schema catalog from {:?}", schema_path))?;

        let docs = match &config.catalog.docs {
            Some(docs_path) => Some(Arc::new(
                DocsCatalog::from_file(docs_path)
                    .with_context(|| format!("Failed to load documentation from {:?}", docs_path))?,
            )),
            None => None,
        };

        tracing::debug!(
            schema = %schema_path.display(),
            docs = docs.is_some(),
            "Loaded catalog"
        );
        Ok(Self {
            config,
            catalog: Arc::new(catalog),
            docs,
        })
    }

    /// A fresh editing session over this workspace's catalogs.
    pub fn session(&self) -> c7n_draft::Session {
        let session = c7n_draft::Session::new(self.catalog.clone());
        match &self.docs {
            Some(docs) => session.with_docs(docs.clone()),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SCHEMA: &str = r#"{
        "definitions": {
            "resources": {"aws.ec2": {"actions": {}, "filters": {}}},
            "actions": {},
            "filters": {}
        }
    }"#;

    #[test]
    fn test_workspace_loads_catalog_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&config_path, "catalog:\n  schema: schema.json\n").unwrap();

        let config = load_config(Some(&config_path)).unwrap();
        let workspace = Workspace::load(config).unwrap();
        assert!(workspace.docs.is_none());

        let mut session = workspace.session();
        session.set_resource("aws.ec2").unwrap();
        assert_eq!(session.current().map(|d| d.name.as_str()), Some("My ec2 policy"));
    }

    #[test]
    fn test_missing_catalog_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&config_path, "catalog:\n  schema: absent.json\n").unwrap();

        let config = load_config(Some(&config_path)).unwrap();
        let err = Workspace::load(config).err().unwrap();
        assert!(format!("{:#}", err).contains("absent.json"));
    }
}
