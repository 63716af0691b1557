//! Clause documentation scraped from the Cloud Custodian reference pages.
//!
//! The documentation catalog is keyed like the schema catalog:
//!
//! ```text
//! { "aws.ec2": { "actions": {name: {doc, link}}, "filters": {...} },
//!   "common_actions": {name: {doc, link}},
//!   "common_filters": {name: {doc, link}} }
//! ```

use c7n_core::ClauseKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::CatalogError;

/// Documentation for one clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    /// Paragraph text, newline separated.
    #[serde(default)]
    pub doc: String,
    /// Link to the reference page anchor.
    #[serde(default)]
    pub link: String,
}

/// Documentation sections of one resource type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceDocs {
    #[serde(default)]
    pub actions: HashMap<String, DocEntry>,
    #[serde(default)]
    pub filters: HashMap<String, DocEntry>,
}

impl ResourceDocs {
    fn section(&self, kind: ClauseKind) -> &HashMap<String, DocEntry> {
        match kind {
            ClauseKind::Action => &self.actions,
            ClauseKind::Filter => &self.filters,
        }
    }
}

/// The documentation catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsCatalog {
    #[serde(default)]
    pub common_actions: HashMap<String, DocEntry>,
    #[serde(default)]
    pub common_filters: HashMap<String, DocEntry>,
    /// Per-resource sections, keyed by qualified resource name.
    #[serde(flatten)]
    pub resources: HashMap<String, ResourceDocs>,
}

impl DocsCatalog {
    /// Load documentation from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse documentation from JSON text.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Documentation for a clause: the resource section first, then the
    /// common section keyed by qualified name.
    pub fn lookup(&self, resource: &str, kind: ClauseKind, qualified_name: &str) -> Option<&DocEntry> {
        self.resources
            .get(resource)
            .and_then(|docs| docs.section(kind).get(qualified_name))
            .or_else(|| self.common(kind).get(qualified_name))
    }

    fn common(&self, kind: ClauseKind) -> &HashMap<String, DocEntry> {
        match kind {
            ClauseKind::Action => &self.common_actions,
            ClauseKind::Filter => &self.common_filters,
        }
    }
}
