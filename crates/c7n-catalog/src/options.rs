//! Projection of catalog entries into selectable options.
//!
//! For a resource type and clause kind the projector:
//! 1. merges resource-specific clause schemas with the common ones (a
//!    resource entry shadows a common entry of the same name),
//! 2. resolves `$ref` entries and drops those without a `properties` map,
//! 3. attaches documentation,
//! 4. deduplicates by label, keeping the first occurrence,
//! 5. sorts case-insensitively by label, keeping ties in merge order.
//!
//! The catalog is never annotated in place: each call builds fresh options.

use c7n_core::{ClauseKind, local_name};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

use crate::catalog::SchemaCatalog;
use crate::docs::{DocEntry, DocsCatalog};
use crate::error::CatalogError;
use crate::schema::Schema;

/// Anything offered to the user under a display label.
pub trait Labelled {
    fn label(&self) -> &str;
}

/// Where a clause option was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseOrigin {
    /// Declared under the resource type.
    Resource,
    /// Declared in the shared `definitions.actions` / `definitions.filters`.
    Common,
}

/// One selectable action or filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseOption {
    /// Local part of the qualified name.
    pub label: String,
    pub qualified_name: String,
    pub kind: ClauseKind,
    pub origin: ClauseOrigin,
    /// Schema with `$ref` hops already followed.
    pub schema: Schema,
    pub docs: Option<DocEntry>,
}

impl Labelled for ClauseOption {
    fn label(&self) -> &str {
        &self.label
    }
}

/// One selectable resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceOption {
    /// Local part of the qualified name (`ec2`).
    pub label: String,
    /// Qualified name (`aws.ec2`).
    pub qualified_name: String,
}

impl ResourceOption {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        Self {
            label: local_name(&qualified_name).to_string(),
            qualified_name,
        }
    }
}

impl Labelled for ResourceOption {
    fn label(&self) -> &str {
        &self.label
    }
}

/// Builds option lists from the catalog.
pub struct OptionProjector<'a> {
    catalog: &'a SchemaCatalog,
    docs: Option<&'a DocsCatalog>,
}

impl<'a> OptionProjector<'a> {
    /// Create a projector without documentation.
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog, docs: None }
    }

    /// Attach documentation to projected options.
    pub fn with_docs(mut self, docs: &'a DocsCatalog) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Every resource type, in catalog order.
    pub fn project_resources(&self) -> Vec<ResourceOption> {
        self.catalog
            .resource_names()
            .into_iter()
            .map(ResourceOption::new)
            .collect()
    }

    /// Configurable actions of a resource type.
    pub fn project_actions(&self, resource: &str) -> Result<Vec<ClauseOption>, CatalogError> {
        self.project(resource, ClauseKind::Action)
    }

    /// Configurable filters of a resource type.
    pub fn project_filters(&self, resource: &str) -> Result<Vec<ClauseOption>, CatalogError> {
        self.project(resource, ClauseKind::Filter)
    }

    /// Configurable clause options: entries without `properties` are left out.
    pub fn project(&self, resource: &str, kind: ClauseKind) -> Result<Vec<ClauseOption>, CatalogError> {
        self.project_with(resource, kind, true)
    }

    /// Every clause option, parameterless ones included.
    pub fn project_all(&self, resource: &str, kind: ClauseKind) -> Result<Vec<ClauseOption>, CatalogError> {
        self.project_with(resource, kind, false)
    }

    fn project_with(
        &self,
        resource: &str,
        kind: ClauseKind,
        configurable_only: bool,
    ) -> Result<Vec<ClauseOption>, CatalogError> {
        let resource_schema = self.catalog.resource_schema(resource)?;
        let specific = resource_schema.clauses(kind);
        let common = self.catalog.common_clauses(kind);

        let merged = specific
            .iter()
            .map(|(name, value)| (name, value, ClauseOrigin::Resource))
            .chain(
                common
                    .iter()
                    .filter(|(name, _)| !specific.contains_key(name.as_str()))
                    .map(|(name, value)| (name, value, ClauseOrigin::Common)),
            );

        let mut seen = HashSet::new();
        let mut options = Vec::new();
        for (name, value, origin) in merged {
            let schema = self.resolve_entry(resource, kind, origin, name, value)?;
            if configurable_only && !schema.has_properties() {
                continue;
            }

            let label = local_name(name).to_string();
            if !seen.insert(label.clone()) {
                tracing::debug!(
                    resource = %resource,
                    kind = %kind,
                    qualified_name = %name,
                    "Skipping option with duplicate label"
                );
                continue;
            }

            options.push(ClauseOption {
                label,
                qualified_name: name.clone(),
                kind,
                origin,
                schema,
                docs: self
                    .docs
                    .and_then(|docs| docs.lookup(resource, kind, name))
                    .cloned(),
            });
        }

        options.sort_by(|a, b| a.label.to_lowercase().cmp(&b.label.to_lowercase()));

        tracing::debug!(
            resource = %resource,
            kind = %kind,
            count = options.len(),
            "Projected clause options"
        );
        Ok(options)
    }

    fn resolve_entry(
        &self,
        resource: &str,
        kind: ClauseKind,
        origin: ClauseOrigin,
        name: &str,
        value: &Value,
    ) -> Result<Schema, CatalogError> {
        let location = match origin {
            ClauseOrigin::Resource => format!(
                "#/definitions/resources/{}/{}/{}",
                resource,
                kind.plural(),
                name
            ),
            ClauseOrigin::Common => format!("#/definitions/{}/{}", kind.plural(), name),
        };
        let schema = Schema::from_value(value, &location)?;
        self.catalog.follow_refs(schema)
    }
}

/// Options whose lower-cased label contains the lower-cased `needle`.
pub fn filter_by_label<T: Labelled + Clone>(options: &[T], needle: &str) -> Vec<T> {
    let needle = needle.to_lowercase();
    options
        .iter()
        .filter(|option| option.label().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
