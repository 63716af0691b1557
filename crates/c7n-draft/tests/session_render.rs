//! End-to-end: catalog to session to rendered document.

use std::sync::Arc;

use c7n_catalog::{OptionProjector, SchemaCatalog};
use c7n_core::{ClauseKind, OutputFormat};
use c7n_draft::Session;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn catalog_json() -> Value {
    json!({
        "definitions": {
            "resources": {
                "aws.ec2": {
                    "actions": {
                        "stop": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["type"],
                            "properties": {
                                "type": {"enum": ["stop"]},
                                "hibernate": {"type": "boolean"}
                            }
                        },
                        "mark-for-op": {"$ref": "#/definitions/actions/mark-for-op"}
                    },
                    "filters": {
                        "instance-age": {
                            "type": "object",
                            "required": ["type"],
                            "properties": {
                                "type": {"enum": ["instance-age"]},
                                "days": {"type": "number", "minimum": 0},
                                "op": {"$ref": "#/definitions/filters_common/comparison_operators"}
                            }
                        },
                        "value": {"$ref": "#/definitions/filters/value"}
                    }
                }
            },
            "actions": {
                "mark-for-op": {
                    "type": "object",
                    "required": ["type"],
                    "properties": {
                        "type": {"enum": ["mark-for-op"]},
                        "tag": {"type": "string"},
                        "op": {"type": "string"},
                        "days": {"type": "integer", "minimum": 0}
                    }
                },
                "notify": {
                    "type": "object",
                    "required": ["type", "to"],
                    "properties": {
                        "type": {"enum": ["notify"]},
                        "to": {"type": "array", "items": {"type": "string", "pattern": "^[^@]+@[^@]+$"}},
                        "subject": {"type": "string"}
                    }
                }
            },
            "filters": {
                "value": {
                    "type": "object",
                    "required": ["type"],
                    "properties": {
                        "type": {"enum": ["value"]},
                        "key": {"type": "string"},
                        "value": {"type": "string"}
                    }
                }
            },
            "filters_common": {
                "comparison_operators": {"enum": ["eq", "ne", "gt", "lt"]}
            }
        }
    })
}

/// Check a clause value map against its option schema, `$ref`s resolving
/// into the catalog definitions.
fn assert_conforms(catalog: &Value, clause_schema: &Value, instance: &Value) {
    let mut schema = clause_schema.clone();
    schema["definitions"] = catalog["definitions"].clone();

    let validator = jsonschema::draft7::options()
        .build(&schema)
        .expect("schema must compile");
    if !validator.is_valid(instance) {
        let messages: Vec<String> = validator.iter_errors(instance).map(|e| e.to_string()).collect();
        panic!("{} did not validate: {}", instance, messages.join("; "));
    }
}

#[test]
fn test_session_values_conform_to_catalog() {
    let root = catalog_json();
    let catalog = Arc::new(SchemaCatalog::from_value(root.clone()).unwrap());
    let mut session = Session::new(catalog.clone());
    session.set_resource("aws.ec2").unwrap();
    session.set_name("  ec2 hygiene ").unwrap();

    session.choose(ClauseKind::Action, 0, "notify").unwrap();
    session
        .set_field(ClauseKind::Action, 0, "to", "ops@example.com\n\nsec@example.com")
        .unwrap();
    session.set_field(ClauseKind::Action, 0, "subject", "Old instances").unwrap();
    let index = session.add_clause(ClauseKind::Action).unwrap();
    session.choose(ClauseKind::Action, index, "mark-for-op").unwrap();
    session.set_field(ClauseKind::Action, index, "days", "4").unwrap();

    session.choose(ClauseKind::Filter, 0, "instance-age").unwrap();
    session.set_field(ClauseKind::Filter, 0, "days", "30").unwrap();
    session.set_field(ClauseKind::Filter, 0, "op", "gt").unwrap();

    let projector = OptionProjector::new(&catalog);
    let draft = session.current().unwrap();
    for kind in ClauseKind::ALL {
        let options = projector.project("aws.ec2", kind).unwrap();
        for slot in draft.populated(kind) {
            let option = options.iter().find(|o| o.label == slot.option.label).unwrap();
            let schema = serde_json::to_value(&option.schema).unwrap();
            assert_conforms(&root, &schema, &Value::Object(slot.values.clone()));
        }
    }

    let rendered: Value = serde_json::from_str(&session.render(OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(
        rendered,
        json!({
            "policies": [{
                "name": "ec2 hygiene",
                "resource": "ec2",
                "actions": [
                    {"type": "notify", "to": ["ops@example.com", "sec@example.com"], "subject": "Old instances"},
                    {"type": "mark-for-op", "days": 4}
                ],
                "filters": [
                    {"type": "instance-age", "days": 30, "op": "gt"}
                ]
            }]
        })
    );
}

#[test]
fn test_invalid_input_never_reaches_output() {
    let catalog = Arc::new(SchemaCatalog::from_value(catalog_json()).unwrap());
    let mut session = Session::new(catalog);
    session.set_resource("ec2").unwrap();
    session.choose(ClauseKind::Action, 0, "notify").unwrap();

    let outcome = session
        .set_field(ClauseKind::Action, 0, "to", "ops@example.com\nnot-an-address")
        .unwrap();
    assert!(outcome.error().is_some());
    assert_eq!(
        session.missing_required(ClauseKind::Action, 0).unwrap(),
        vec!["to".to_string()]
    );

    let yaml: Value = serde_yaml::from_str(&session.render(OutputFormat::Yaml).unwrap()).unwrap();
    assert_eq!(yaml["policies"][0]["actions"], json!([{"type": "notify"}]));
}

#[test]
fn test_yaml_and_json_agree_for_session() {
    let catalog = Arc::new(SchemaCatalog::from_value(catalog_json()).unwrap());
    let mut session = Session::new(catalog);
    session.set_resource("aws.ec2").unwrap();
    session.choose(ClauseKind::Action, 0, "stop").unwrap();
    session.set_field(ClauseKind::Action, 0, "hibernate", "true").unwrap();
    session.choose(ClauseKind::Filter, 0, "value").unwrap();
    session.set_field(ClauseKind::Filter, 0, "key", "tag:Name").unwrap();

    let json: Value = serde_json::from_str(&session.render(OutputFormat::Json).unwrap()).unwrap();
    let yaml: Value = serde_yaml::from_str(&session.render(OutputFormat::Yaml).unwrap()).unwrap();
    assert_eq!(json, yaml);
    assert_eq!(json["policies"][0]["actions"][0], json!({"type": "stop", "hibernate": true}));
}
