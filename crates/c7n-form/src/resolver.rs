//! Schema interpretation: choose the input control for a parameter.
//!
//! Dispatch follows [`SchemaKind`], first match wins:
//!
//! | Fragment | Control |
//! |----------|---------|
//! | `$ref` | resolve, then interpret the target |
//! | `type: [..]` | unsupported (multiple types) |
//! | `type: string` | choice if `enum`, else free text with `pattern` |
//! | `type: number` / `integer` | number within `minimum`/`maximum` |
//! | `type: boolean` | true / false |
//! | `type: object` | nested sub-form if `properties`, else as string |
//! | `type: array` | one value per line for string/number items |
//! | other `type` | unsupported (type name) |
//! | `enum` only | fixed value if one entry, else choice |
//! | `oneOf` | unsupported |
//! | anything else | unsupported (unknown) |

use c7n_catalog::{CatalogError, Items, Schema, SchemaCatalog, SchemaKind};

use crate::input::{Control, InputSpec, ObjectInput, Pattern, UnsupportedShape};

/// Resolves schema fragments to input specifications.
///
/// Resolution reads the catalog and never modifies it or the schema given:
/// resolving the same fragment twice yields equal specs.
#[derive(Clone, Copy)]
pub struct InputResolver<'a> {
    catalog: &'a SchemaCatalog,
}

impl<'a> InputResolver<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog `$ref` pointers are resolved against.
    pub fn catalog(&self) -> &'a SchemaCatalog {
        self.catalog
    }

    /// Choose the input for the property `name`.
    ///
    /// Fails only on catalog corruption (a dangling or cyclic `$ref`, a
    /// malformed fragment). Unsupported shapes are not errors.
    pub fn resolve(&self, name: &str, schema: &Schema, required: bool) -> Result<InputSpec, CatalogError> {
        let schema = self.catalog.follow_refs(schema.clone())?;

        let control = match schema.kind() {
            SchemaKind::MultipleTypes(types) => {
                unsupported(name, UnsupportedShape::MultipleTypes(types.to_vec()))
            }
            SchemaKind::String => text_control(&schema, false),
            SchemaKind::Number { .. } => Control::Number {
                minimum: schema.minimum,
                maximum: schema.maximum,
                multiline: false,
            },
            SchemaKind::Boolean => Control::Boolean,
            SchemaKind::Object if schema.has_properties() => Control::Object(ObjectInput {
                title: name.to_string(),
                schema: schema.clone(),
            }),
            SchemaKind::Object => text_control(&schema, false),
            SchemaKind::Array => self.array_control(name, &schema)?,
            SchemaKind::OtherType(ty) => unsupported(name, UnsupportedShape::UnknownType(ty.to_string())),
            SchemaKind::Enum([only]) => Control::Fixed(only.clone()),
            SchemaKind::Enum(choices) => Control::Choice {
                choices: choices.to_vec(),
                multiline: false,
            },
            SchemaKind::OneOf => unsupported(name, UnsupportedShape::OneOf),
            SchemaKind::Reference(_) | SchemaKind::Unknown => {
                unsupported(name, UnsupportedShape::Unknown)
            }
        };

        Ok(InputSpec::new(control, required))
    }

    /// Arrays of strings or numbers are entered one value per line.
    ///
    /// `minItems` / `maxItems` are not enforced.
    fn array_control(&self, name: &str, schema: &Schema) -> Result<Control, CatalogError> {
        let item = match schema.items(name)? {
            Items::Absent => {
                return Ok(Control::FreeText {
                    pattern: None,
                    multiline: true,
                });
            }
            Items::Tuple(arity) => {
                return Ok(unsupported(
                    name,
                    UnsupportedShape::ArrayItems(format!("tuple of {}", arity)),
                ));
            }
            Items::Single(item) => self.catalog.follow_refs(item)?,
        };

        let control = match item.kind() {
            SchemaKind::String | SchemaKind::Unknown => text_control(&item, true),
            SchemaKind::Enum(choices) => Control::Choice {
                choices: choices.to_vec(),
                multiline: true,
            },
            SchemaKind::Number { .. } => Control::Number {
                minimum: item.minimum,
                maximum: item.maximum,
                multiline: true,
            },
            SchemaKind::Object => unsupported(name, UnsupportedShape::ArrayItems("object".to_string())),
            SchemaKind::Array => unsupported(name, UnsupportedShape::ArrayItems("array".to_string())),
            SchemaKind::Boolean => unsupported(name, UnsupportedShape::ArrayItems("boolean".to_string())),
            SchemaKind::MultipleTypes(types) => unsupported(
                name,
                UnsupportedShape::ArrayItems(types.join(" | ")),
            ),
            SchemaKind::OtherType(ty) => unsupported(name, UnsupportedShape::ArrayItems(ty.to_string())),
            SchemaKind::OneOf => unsupported(name, UnsupportedShape::ArrayItems("oneOf".to_string())),
            SchemaKind::Reference(pointer) => {
                unsupported(name, UnsupportedShape::ArrayItems(pointer.to_string()))
            }
        };
        Ok(control)
    }
}

/// String input: a choice when `enum` is present, else free text.
fn text_control(schema: &Schema, multiline: bool) -> Control {
    match &schema.choices {
        Some(choices) => Control::Choice {
            choices: choices.clone(),
            multiline,
        },
        None => Control::FreeText {
            pattern: schema.pattern.as_deref().and_then(Pattern::compile),
            multiline,
        },
    }
}

fn unsupported(name: &str, shape: UnsupportedShape) -> Control {
    tracing::debug!(field = %name, shape = %shape, "Unsupported schema shape");
    Control::Unsupported(shape)
}
