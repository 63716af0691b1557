//! Typed view of JSON-Schema fragments.
//!
//! The catalog stores raw JSON. A [`Schema`] is the subset of JSON-Schema the
//! builder interprets; unknown keywords are ignored. [`Schema::kind`]
//! classifies a fragment once into a closed [`SchemaKind`] so callers can
//! dispatch with a single `match`.

use c7n_core::ValueMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

/// A JSON-Schema-like node describing one parameter or clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Pointer into the catalog tree (`#/definitions/...`).
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Declared type, either one name or a list of names.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeDecl>,

    /// Allowed values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,

    /// Alternative sub-schemas (not interpreted).
    #[serde(rename = "oneOf", default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Value>>,

    /// Named sub-schemas of an object, in catalog order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ValueMap>,

    /// Names of required properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Item schema of an array (an object, or a list for tuple form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Regular expression a non-empty string value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Not enforced.
    #[serde(rename = "minItems", default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    /// Not enforced.
    #[serde(rename = "maxItems", default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The `type` keyword: one type name or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    Single(String),
    Multiple(Vec<String>),
}

/// Closed classification of a schema fragment, first match wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    /// `$ref` present; must be resolved before interpretation.
    Reference(&'a str),
    /// `type` is a list of names.
    MultipleTypes(&'a [String]),
    String,
    Number { integer: bool },
    Boolean,
    Object,
    Array,
    /// A scalar `type` the builder does not interpret (e.g. `null`).
    OtherType(&'a str),
    /// No `type`, but an `enum`.
    Enum(&'a [Value]),
    /// No `type` and no `enum`, but a `oneOf`.
    OneOf,
    Unknown,
}

/// Declared item schema of an array.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// No `items` keyword.
    Absent,
    Single(Schema),
    /// Tuple form (`items: [...]`) with the given arity.
    Tuple(usize),
}

impl Schema {
    /// Parse a fragment, reporting `location` on failure.
    pub fn from_value(value: &Value, location: &str) -> Result<Self, CatalogError> {
        serde_json::from_value(value.clone()).map_err(|source| CatalogError::MalformedSchema {
            location: location.to_string(),
            source,
        })
    }

    /// Classify this fragment.
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(pointer) = &self.reference {
            return SchemaKind::Reference(pointer);
        }
        match &self.ty {
            Some(TypeDecl::Multiple(types)) => SchemaKind::MultipleTypes(types),
            Some(TypeDecl::Single(ty)) => match ty.as_str() {
                "string" => SchemaKind::String,
                "number" => SchemaKind::Number { integer: false },
                "integer" => SchemaKind::Number { integer: true },
                "boolean" => SchemaKind::Boolean,
                "object" => SchemaKind::Object,
                "array" => SchemaKind::Array,
                other => SchemaKind::OtherType(other),
            },
            None => {
                if let Some(choices) = &self.choices {
                    SchemaKind::Enum(choices)
                } else if self.one_of.is_some() {
                    SchemaKind::OneOf
                } else {
                    SchemaKind::Unknown
                }
            }
        }
    }

    /// True when the fragment declares a `properties` map.
    pub fn has_properties(&self) -> bool {
        self.properties.is_some()
    }

    /// True when `name` is listed in `required`.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Parse every property sub-schema, in catalog order.
    pub fn property_schemas(&self, location: &str) -> Result<Vec<(String, Schema)>, CatalogError> {
        let Some(properties) = &self.properties else {
            return Ok(Vec::new());
        };
        properties
            .iter()
            .map(|(name, value)| {
                let schema = Schema::from_value(value, &format!("{}/properties/{}", location, name))?;
                Ok((name.clone(), schema))
            })
            .collect()
    }

    /// Parse the `items` keyword.
    pub fn items(&self, location: &str) -> Result<Items, CatalogError> {
        match self.items.as_deref() {
            None => Ok(Items::Absent),
            Some(Value::Array(tuple)) => Ok(Items::Tuple(tuple.len())),
            Some(value) => Ok(Items::Single(Schema::from_value(
                value,
                &format!("{}/items", location),
            )?)),
        }
    }
}
