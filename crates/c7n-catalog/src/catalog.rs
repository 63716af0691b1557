//! The reference schema catalog.
//!
//! The catalog is a JSON-Schema document shaped like the one Cloud Custodian
//! publishes (`custodian schema --json`):
//!
//! ```text
//! definitions:
//!   resources:  { "<resource>": { actions: {name: schema}, filters: {name: schema} } }
//!   actions:    { "<common action>": schema }
//!   filters:    { "<common filter>": schema }
//! ```
//!
//! It is loaded once and never modified. Lookups are pure: the same pointer
//! always resolves to the same fragment.

use c7n_core::{ClauseKind, ValueMap};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::CatalogError;
use crate::schema::Schema;

/// Marker that starts every `$ref` pointer.
pub const ROOT_MARKER: &str = "#";

/// Longest `$ref` chain followed before it is treated as a cycle.
pub const MAX_REF_HOPS: usize = 32;

/// Clause schemas declared for one resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSchema {
    /// Qualified resource type name (`aws.ec2`).
    pub name: String,
    /// Resource-specific action schemas, in catalog order.
    pub actions: ValueMap,
    /// Resource-specific filter schemas, in catalog order.
    pub filters: ValueMap,
}

impl ResourceSchema {
    /// The clause schemas of one kind.
    pub fn clauses(&self, kind: ClauseKind) -> &ValueMap {
        match kind {
            ClauseKind::Action => &self.actions,
            ClauseKind::Filter => &self.filters,
        }
    }
}

/// Read-only accessor over the loaded catalog document.
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    root: Value,
}

impl SchemaCatalog {
    /// Load a catalog from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// Wrap an already-parsed catalog document.
    ///
    /// Fails when `definitions.resources` is missing or not an object.
    pub fn from_value(root: Value) -> Result<Self, CatalogError> {
        match root.get("definitions").and_then(|d| d.get("resources")) {
            Some(Value::Object(_)) => {}
            _ => {
                return Err(CatalogError::MissingSection {
                    section: "definitions.resources".to_string(),
                });
            }
        }

        let catalog = Self { root };
        tracing::debug!(
            resources = catalog.resources().map_or(0, |r| r.len()),
            "Loaded schema catalog"
        );
        Ok(catalog)
    }

    /// The raw catalog document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Resource type names, in catalog order.
    pub fn resource_names(&self) -> Vec<String> {
        self.resources()
            .map(|resources| resources.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Look up a resource type.
    pub fn resource_schema(&self, name: &str) -> Result<ResourceSchema, CatalogError> {
        let entry = self
            .resources()
            .and_then(|resources| resources.get(name))
            .ok_or_else(|| CatalogError::NotFound {
                resource: name.to_string(),
            })?;

        Ok(ResourceSchema {
            name: name.to_string(),
            actions: object_at(entry, ClauseKind::Action.plural()),
            filters: object_at(entry, ClauseKind::Filter.plural()),
        })
    }

    /// Common clause schemas shared by every resource type.
    pub fn common_clauses(&self, kind: ClauseKind) -> ValueMap {
        self.root
            .get("definitions")
            .map(|definitions| object_at(definitions, kind.plural()))
            .unwrap_or_default()
    }

    /// Resolve a `$ref` pointer to the fragment it names.
    ///
    /// The pointer is a slash-delimited path starting with [`ROOT_MARKER`];
    /// segments use JSON-pointer escaping (`~1` for `/`, `~0` for `~`). Only
    /// one hop is taken: a fragment that is itself a `$ref` is returned as is.
    pub fn resolve_ref(&self, pointer: &str) -> Result<Schema, CatalogError> {
        let value = self.lookup_pointer(pointer)?;
        Schema::from_value(value, pointer)
    }

    /// Follow `$ref` hops until the fragment is no longer a reference.
    pub fn follow_refs(&self, schema: Schema) -> Result<Schema, CatalogError> {
        let mut current = schema;
        let mut hops = 0;
        while let Some(pointer) = current.reference.clone() {
            if hops == MAX_REF_HOPS {
                return Err(CatalogError::ReferenceCycle { pointer });
            }
            current = self.resolve_ref(&pointer)?;
            hops += 1;
        }
        Ok(current)
    }

    /// Walk `pointer` through the catalog and return the raw value.
    pub fn lookup_pointer(&self, pointer: &str) -> Result<&Value, CatalogError> {
        let dangling = |segment: &str| CatalogError::DanglingReference {
            pointer: pointer.to_string(),
            segment: segment.to_string(),
        };

        let mut segments = pointer.split('/');
        match segments.next() {
            Some(ROOT_MARKER) => {}
            Some(other) => return Err(dangling(other)),
            None => return Err(dangling("")),
        }

        let mut current = &self.root;
        for raw in segments {
            let segment = unescape_segment(raw);
            let next = match current {
                Value::Object(map) => map.get(&segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| dangling(&segment))?;
        }
        Ok(current)
    }

    fn resources(&self) -> Option<&ValueMap> {
        self.root
            .get("definitions")
            .and_then(|definitions| definitions.get("resources"))
            .and_then(Value::as_object)
    }
}

/// Clone the object stored under `key`, or an empty map.
fn object_at(value: &Value, key: &str) -> ValueMap {
    match value.get(key) {
        Some(Value::Object(map)) => map.clone(),
        _ => ValueMap::new(),
    }
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaKind;
    use serde_json::json;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::from_value(json!({
            "definitions": {
                "resources": {
                    "aws.ec2": {
                        "actions": {"stop": {"type": "object", "properties": {"type": {"enum": ["stop"]}}}},
                        "filters": {"value": {"$ref": "#/definitions/filters/value"}}
                    },
                    "aws.s3": {"actions": {}}
                },
                "actions": {"notify": {"type": "object", "properties": {}}},
                "filters": {
                    "value": {"type": "object", "properties": {"key": {"type": "string"}}},
                    "a/b": {"type": "string"}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_resource_names_in_catalog_order() {
        assert_eq!(catalog().resource_names(), vec!["aws.ec2", "aws.s3"]);
    }

    #[test]
    fn test_resource_schema_lookup() {
        let ec2 = catalog().resource_schema("aws.ec2").unwrap();
        assert_eq!(ec2.name, "aws.ec2");
        assert!(ec2.actions.contains_key("stop"));
        assert!(ec2.clauses(ClauseKind::Filter).contains_key("value"));

        let s3 = catalog().resource_schema("aws.s3").unwrap();
        assert!(s3.filters.is_empty());
    }

    #[test]
    fn test_unknown_resource_is_not_found() {
        let err = catalog().resource_schema("aws.lambda").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { resource } if resource == "aws.lambda"));
    }

    #[test]
    fn test_common_clauses() {
        let catalog = catalog();
        assert!(catalog.common_clauses(ClauseKind::Action).contains_key("notify"));
        assert_eq!(catalog.common_clauses(ClauseKind::Filter).len(), 2);
    }

    #[test]
    fn test_resolve_ref() {
        let schema = catalog().resolve_ref("#/definitions/filters/value").unwrap();
        assert_eq!(schema.kind(), SchemaKind::Object);
        assert!(schema.has_properties());
    }

    #[test]
    fn test_resolve_ref_is_pure() {
        let catalog = catalog();
        let first = catalog.resolve_ref("#/definitions/filters/value").unwrap();
        let second = catalog.resolve_ref("#/definitions/filters/value").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_escaped_segment() {
        let schema = catalog().resolve_ref("#/definitions/filters/a~1b").unwrap();
        assert_eq!(schema.kind(), SchemaKind::String);
    }

    #[test]
    fn test_follow_refs_through_chain() {
        let catalog = SchemaCatalog::from_value(json!({
            "definitions": {
                "resources": {},
                "filters": {
                    "alias": {"$ref": "#/definitions/filters/value"},
                    "value": {"type": "object", "properties": {}}
                }
            }
        }))
        .unwrap();

        let start = Schema {
            reference: Some("#/definitions/filters/alias".to_string()),
            ..Schema::default()
        };
        let resolved = catalog.follow_refs(start).unwrap();
        assert_eq!(resolved.kind(), SchemaKind::Object);
    }

    #[test]
    fn test_follow_refs_detects_cycle() {
        let catalog = SchemaCatalog::from_value(json!({
            "definitions": {
                "resources": {},
                "filters": {
                    "ping": {"$ref": "#/definitions/filters/pong"},
                    "pong": {"$ref": "#/definitions/filters/ping"}
                }
            }
        }))
        .unwrap();

        let start = Schema {
            reference: Some("#/definitions/filters/ping".to_string()),
            ..Schema::default()
        };
        assert!(matches!(
            catalog.follow_refs(start),
            Err(CatalogError::ReferenceCycle { .. })
        ));
    }

    #[test]
    fn test_dangling_reference_fails() {
        let err = catalog()
            .resolve_ref("#/definitions/filters/missing")
            .unwrap_err();
        match err {
            CatalogError::DanglingReference { pointer, segment } => {
                assert_eq!(pointer, "#/definitions/filters/missing");
                assert_eq!(segment, "missing");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_pointer_without_root_marker_fails() {
        let err = catalog().resolve_ref("definitions/filters/value").unwrap_err();
        assert!(matches!(err, CatalogError::DanglingReference { .. }));
    }

    #[test]
    fn test_missing_resources_section() {
        let err = SchemaCatalog::from_value(json!({"definitions": {}})).unwrap_err();
        assert!(matches!(err, CatalogError::MissingSection { .. }));
    }
}
