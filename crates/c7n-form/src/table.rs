//! Properties tables: the resolved form of one object schema.

use c7n_catalog::{CatalogError, Schema};
use c7n_core::{ValueMap, upsert};
use serde_json::Value;

use crate::input::{Control, FieldOutcome, InputSpec, ObjectInput};
use crate::resolver::InputResolver;

/// One row of a properties table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub input: InputSpec,
    pub description: Option<String>,
}

/// Resolved inputs for every property of an object schema, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesTable {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl PropertiesTable {
    /// Resolve every property of `schema`.
    ///
    /// Nested objects are not expanded here; see [`ObjectInput::table`].
    pub fn build(resolver: &InputResolver<'_>, title: &str, schema: &Schema) -> Result<Self, CatalogError> {
        let schema = resolver.catalog().follow_refs(schema.clone())?;

        let mut fields = Vec::new();
        for (name, property) in schema.property_schemas(title)? {
            let required = schema.is_required(&name);
            let input = resolver.resolve(&name, &property, required)?;
            fields.push(FieldSpec {
                description: property.description.clone(),
                name,
                required,
                input,
            });
        }

        tracing::debug!(title = %title, fields = fields.len(), "Built properties table");
        Ok(Self {
            title: title.to_string(),
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Values of every single-value enum field, keyed by field name.
    pub fn fixed_values(&self) -> ValueMap {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .input
                    .fixed_value()
                    .map(|value| (field.name.clone(), value.clone()))
            })
            .collect()
    }

    /// Required fields with no value in `values`.
    pub fn missing_required(&self, values: &ValueMap) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| field.required && !values.contains_key(&field.name))
            .map(|field| field.name.clone())
            .collect()
    }

    /// Find the field at `path`, entering nested object sub-forms.
    ///
    /// Returns `None` when a segment names no field, or when a non-final
    /// segment is not a nested object.
    pub fn locate<S: AsRef<str>>(
        &self,
        resolver: &InputResolver<'_>,
        path: &[S],
    ) -> Result<Option<FieldSpec>, CatalogError> {
        let Some((head, rest)) = path.split_first() else {
            return Ok(None);
        };
        let Some(field) = self.field(head.as_ref()) else {
            return Ok(None);
        };
        if rest.is_empty() {
            return Ok(Some(field.clone()));
        }

        match &field.input.control {
            Control::Object(object) => object.table(resolver)?.locate(resolver, rest),
            _ => Ok(None),
        }
    }

    /// Apply a validation outcome for `name` to `values`.
    ///
    /// A value is upserted; an unset or invalid outcome removes the key.
    /// Sibling keys are never touched.
    pub fn commit(values: &ValueMap, name: &str, outcome: &FieldOutcome) -> ValueMap {
        let value = outcome.value().cloned().unwrap_or(Value::Null);
        upsert(values, name, value)
    }
}

impl ObjectInput {
    /// Build the nested sub-form for this object.
    pub fn table(&self, resolver: &InputResolver<'_>) -> Result<PropertiesTable, CatalogError> {
        PropertiesTable::build(resolver, &self.title, &self.schema)
    }
}
