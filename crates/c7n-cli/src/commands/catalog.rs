//! Catalog browsing commands.
//!
//! `c7n-builder resources` - List resource types.
//! `c7n-builder options` - List the actions or filters offered for a resource.
//! `c7n-builder describe` - Show the input form of one action or filter.

use anyhow::{Context, Result};
use c7n_catalog::{ClauseOption, OptionProjector, filter_by_label};
use c7n_core::ClauseKind;
use c7n_form::{Control, FieldSpec, InputResolver, InputSpec, PropertiesTable, choice_label};

use super::Workspace;

/// Nested sub-forms deeper than this are summarized, not expanded.
const MAX_DESCRIBE_DEPTH: usize = 4;

fn projector(workspace: &Workspace) -> OptionProjector<'_> {
    let projector = OptionProjector::new(&workspace.catalog);
    match &workspace.docs {
        Some(docs) => projector.with_docs(docs),
        None => projector,
    }
}

/// List resource types, optionally filtered by label.
pub fn resources(workspace: &Workspace, filter: Option<&str>) -> Result<()> {
    let all = projector(workspace).project_resources();
    let shown = match filter {
        Some(needle) => filter_by_label(&all, needle),
        None => all,
    };

    println!("\nResource types ({}):", shown.len());
    for resource in &shown {
        println!("   • {} ({})", resource.label, resource.qualified_name);
    }
    println!();
    Ok(())
}

/// List clause options for a resource.
pub fn options(
    workspace: &Workspace,
    resource: &str,
    kind: ClauseKind,
    filter: Option<&str>,
    all: bool,
) -> Result<()> {
    let projector = projector(workspace);
    let options = if all {
        projector.project_all(resource, kind)
    } else {
        projector.project(resource, kind)
    }
    .with_context(|| format!("Failed to list {} for {}", kind.plural(), resource))?;

    let shown = match filter {
        Some(needle) => filter_by_label(&options, needle),
        None => options,
    };

    println!("\n{} for {} ({}):", kind.plural(), resource, shown.len());
    for option in &shown {
        println!("   • {}", option_line(option));
        if let Some(docs) = &option.docs {
            if let Some(first) = docs.doc.lines().map(str::trim).find(|l| !l.is_empty()) {
                println!("     {}", first);
            }
        }
    }
    println!();
    Ok(())
}

fn option_line(option: &ClauseOption) -> String {
    let mut line = option.label.clone();
    if option.qualified_name != option.label {
        line.push_str(&format!(" ({})", option.qualified_name));
    }
    if !option.schema.has_properties() {
        line.push_str(" [no parameters]");
    }
    line
}

/// Print the resolved form of one clause option.
pub fn describe(workspace: &Workspace, resource: &str, kind: ClauseKind, name: &str) -> Result<()> {
    let options = projector(workspace)
        .project_all(resource, kind)
        .with_context(|| format!("Failed to list {} for {}", kind.plural(), resource))?;
    let option = options
        .iter()
        .find(|o| o.label == name || o.qualified_name == name)
        .with_context(|| format!("No {} named '{}' for {}", kind, name, resource))?;

    let resolver = InputResolver::new(&workspace.catalog);
    let table = PropertiesTable::build(&resolver, &option.label, &option.schema)
        .with_context(|| format!("Failed to resolve the form of '{}'", option.qualified_name))?;

    println!("\n{}: {}", kind, option.qualified_name);
    if let Some(docs) = &option.docs {
        println!("\n{}", docs.doc.trim());
        println!("   {}", docs.link);
    }
    println!("\nFields (* required):");
    for line in describe_table(&resolver, &table, 0)? {
        println!("{}", line);
    }
    println!();
    Ok(())
}

/// One line per field, nested sub-forms indented under their object field.
pub fn describe_table(resolver: &InputResolver<'_>, table: &PropertiesTable, depth: usize) -> Result<Vec<String>> {
    let indent = "   ".repeat(depth + 1);
    let mut lines = Vec::new();
    for field in &table.fields {
        lines.push(format!("{}{}", indent, field_line(field)));

        if let Control::Object(object) = &field.input.control {
            if depth + 1 >= MAX_DESCRIBE_DEPTH {
                lines.push(format!("{}   ...", indent));
                continue;
            }
            let nested = object.table(resolver)?;
            lines.extend(describe_table(resolver, &nested, depth + 1)?);
        }
    }
    Ok(lines)
}

fn field_line(field: &FieldSpec) -> String {
    let marker = if field.required { "*" } else { " " };
    let mut line = format!("{}{}  {}", field.name, marker, control_summary(&field.input));
    if let Some(helper) = field.input.helper_text() {
        line.push_str(&format!("  ({})", helper));
    }
    if let Some(description) = &field.description {
        line.push_str(&format!("  - {}", description));
    }
    line
}

/// Short name of the control collecting a field.
pub fn control_summary(input: &InputSpec) -> String {
    match &input.control {
        Control::FreeText { multiline: true, .. } => "text, one per line".to_string(),
        Control::FreeText { multiline: false, .. } => "text".to_string(),
        Control::Choice { multiline: true, .. } => "choice, one per line".to_string(),
        Control::Choice { multiline: false, .. } => "choice".to_string(),
        Control::Number { multiline: true, .. } => "number, one per line".to_string(),
        Control::Number { multiline: false, .. } => "number".to_string(),
        Control::Boolean => "boolean".to_string(),
        Control::Object(_) => "object".to_string(),
        Control::Fixed(value) => format!("fixed = {}", choice_label(value)),
        Control::Unsupported(shape) => format!("unsupported: {}", shape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c7n_catalog::SchemaCatalog;
    use serde_json::json;

    #[test]
    fn test_describe_table_expands_nested_objects() {
        let catalog = SchemaCatalog::from_value(json!({
            "definitions": {
                "resources": {},
                "actions": {
                    "tag": {
                        "type": "object",
                        "required": ["type", "key"],
                        "properties": {
                            "type": {"enum": ["tag"]},
                            "key": {"type": "string"},
                            "meta": {"type": "object", "properties": {"days": {"type": "integer", "minimum": 1}}},
                            "either": {"oneOf": []}
                        }
                    }
                }
            }
        }))
        .unwrap();
        let resolver = InputResolver::new(&catalog);
        let schema = catalog.resolve_ref("#/definitions/actions/tag").unwrap();
        let table = PropertiesTable::build(&resolver, "tag", &schema).unwrap();

        let lines = describe_table(&resolver, &table, 0).unwrap();
        assert_eq!(
            lines,
            vec![
                "   type*  fixed = tag",
                "   key*  text",
                "   meta   object",
                "      days   number  (Min: 1)",
                "   either   unsupported: oneOf",
            ]
        );
    }

    #[test]
    fn test_recursive_objects_stop_at_max_depth() {
        let catalog = SchemaCatalog::from_value(json!({
            "definitions": {
                "resources": {},
                "node": {"type": "object", "properties": {"child": {"$ref": "#/definitions/node"}}}
            }
        }))
        .unwrap();
        let resolver = InputResolver::new(&catalog);
        let schema = catalog.resolve_ref("#/definitions/node").unwrap();
        let table = PropertiesTable::build(&resolver, "node", &schema).unwrap();

        let lines = describe_table(&resolver, &table, 0).unwrap();
        assert_eq!(lines.len(), MAX_DESCRIBE_DEPTH + 1);
        assert_eq!(lines.last().unwrap().trim(), "...");
    }
}
