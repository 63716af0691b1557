//! Editing sessions.
//!
//! A [`Session`] ties the pure draft transitions to the catalog: it looks up
//! options by name, enforces the exclusion rules, resolves field inputs and
//! validates raw text before committing it. State is replaced, never mutated
//! in place: each successful command swaps in a new [`PolicySet`] snapshot.

use std::sync::Arc;

use c7n_catalog::{ClauseOption, DocsCatalog, OptionProjector, ResourceOption, SchemaCatalog};
use c7n_core::{ClauseKind, OutputFormat};
use c7n_form::{Control, FieldOutcome, InputResolver, PropertiesTable};
use serde_json::Value;

use crate::draft::PolicyDraft;
use crate::error::{RenderError, SessionError};
use crate::render::PolicyDocument;
use crate::set::PolicySet;
use crate::slots::Choice;

/// An in-memory editing session over one catalog.
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Arc<SchemaCatalog>,
    docs: Option<Arc<DocsCatalog>>,
    policies: PolicySet,
    current: usize,
}

impl Session {
    pub fn new(catalog: Arc<SchemaCatalog>) -> Self {
        Self {
            catalog,
            docs: None,
            policies: PolicySet::new(),
            current: 0,
        }
    }

    /// Attach documentation to the options this session offers.
    pub fn with_docs(mut self, docs: Arc<DocsCatalog>) -> Self {
        self.docs = Some(docs);
        self
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    /// Index of the policy slot commands apply to.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current draft, if its slot is populated.
    pub fn current(&self) -> Option<&PolicyDraft> {
        self.policies.get(self.current)
    }

    fn projector(&self) -> OptionProjector<'_> {
        let projector = OptionProjector::new(&self.catalog);
        match &self.docs {
            Some(docs) => projector.with_docs(docs),
            None => projector,
        }
    }

    fn resolver(&self) -> InputResolver<'_> {
        InputResolver::new(&self.catalog)
    }

    fn draft(&self) -> Result<&PolicyDraft, SessionError> {
        self.current().ok_or(SessionError::NoResource)
    }

    fn resource(&self) -> Result<&ResourceOption, SessionError> {
        self.draft()?.resource.as_ref().ok_or(SessionError::NoResource)
    }

    fn commit(&mut self, update: impl FnOnce(&PolicyDraft) -> PolicyDraft) {
        self.policies = self.policies.update(self.current, update);
    }

    // -------------------------------------------------------------------------
    // Policies
    // -------------------------------------------------------------------------

    /// Resource types for the current slot, sibling choices greyed out.
    pub fn resource_choices(&self) -> Vec<Choice<ResourceOption>> {
        self.policies
            .resource_choices(self.current, &self.projector().project_resources())
    }

    /// Make slot `index` current.
    pub fn select_policy(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.policies.len() {
            return Err(SessionError::SlotOutOfRange { index });
        }
        self.current = index;
        Ok(())
    }

    /// Open a policy placeholder (unless one is open) and make it current.
    pub fn new_policy(&mut self) -> usize {
        self.policies = self.policies.add_slot();
        self.current = self.policies.len() - 1;
        tracing::debug!(index = self.current, "Opened policy slot");
        self.current
    }

    /// Delete the current policy slot.
    pub fn drop_policy(&mut self) {
        self.policies = self.policies.delete_at(self.current);
        self.current = self.current.min(self.policies.len() - 1);
        tracing::debug!(index = self.current, "Dropped policy slot");
    }

    /// Start the current policy on `resource` (qualified name or label).
    ///
    /// Any previous name and clauses of the slot are discarded.
    pub fn set_resource(&mut self, resource: &str) -> Result<(), SessionError> {
        let option = self
            .projector()
            .project_resources()
            .into_iter()
            .find(|option| option.qualified_name == resource || option.label == resource)
            .ok_or_else(|| SessionError::UnknownResource {
                resource: resource.to_string(),
            })?;

        if self.policies.chosen_resources(self.current).contains(&option.label.as_str()) {
            return Err(SessionError::AlreadyChosen { label: option.label });
        }

        tracing::debug!(index = self.current, resource = %option.qualified_name, "Selected resource");
        self.policies = self.policies.select_resource(self.current, Some(option));
        Ok(())
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), SessionError> {
        self.resource()?;
        self.commit(|draft| draft.set_name(name));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Clauses
    // -------------------------------------------------------------------------

    /// Clause options for slot `index` of the current policy, sibling choices
    /// greyed out.
    pub fn options(&self, kind: ClauseKind, index: usize) -> Result<Vec<Choice<ClauseOption>>, SessionError> {
        let draft = self.draft()?;
        let resource = self.resource()?;
        let options = self.projector().project(&resource.qualified_name, kind)?;
        Ok(draft.clause_choices(kind, index, &options))
    }

    /// Open a clause placeholder and return its index.
    pub fn add_clause(&mut self, kind: ClauseKind) -> Result<usize, SessionError> {
        self.resource()?;
        self.commit(|draft| draft.add_clause_slot(kind));
        Ok(self.draft()?.clauses(kind).len() - 1)
    }

    /// Put the option named `name` into slot `index`.
    ///
    /// The slot starts from an empty value map, then every single-value enum
    /// field (such as `type`) is set to its fixed value.
    pub fn choose(&mut self, kind: ClauseKind, index: usize, name: &str) -> Result<(), SessionError> {
        let draft = self.draft()?;
        let resource = self.resource()?;
        if index >= draft.clauses(kind).len() {
            return Err(SessionError::SlotOutOfRange { index });
        }

        let options = self.projector().project(&resource.qualified_name, kind)?;
        let option = options
            .into_iter()
            .find(|option| option.label == name || option.qualified_name == name)
            .ok_or_else(|| SessionError::UnknownOption {
                kind,
                option: name.to_string(),
                resource: resource.qualified_name.clone(),
            })?;

        let selectable = draft
            .clause_choices(kind, index, std::slice::from_ref(&option))
            .iter()
            .all(|choice| choice.selectable);
        if !selectable {
            return Err(SessionError::AlreadyChosen { label: option.label });
        }

        let fixed = PropertiesTable::build(&self.resolver(), &option.label, &option.schema)?.fixed_values();
        tracing::debug!(%kind, index, option = %option.qualified_name, fixed = fixed.len(), "Chose clause option");

        self.commit(move |draft| {
            fixed.into_iter().fold(
                draft.set_clause_at(kind, index, Some(option)),
                |draft, (key, value)| draft.set_clause_value(kind, index, &key, value),
            )
        });
        Ok(())
    }

    pub fn delete_clause(&mut self, kind: ClauseKind, index: usize) -> Result<(), SessionError> {
        if index >= self.draft()?.clauses(kind).len() {
            return Err(SessionError::SlotOutOfRange { index });
        }
        self.commit(|draft| draft.delete_clause_at(kind, index));
        Ok(())
    }

    /// The resolved form of the clause in slot `index`.
    pub fn form(&self, kind: ClauseKind, index: usize) -> Result<PropertiesTable, SessionError> {
        let slot = self
            .draft()?
            .clause(kind, index)
            .ok_or(SessionError::SlotOutOfRange { index })?;
        Ok(PropertiesTable::build(&self.resolver(), &slot.option.label, &slot.option.schema)?)
    }

    // -------------------------------------------------------------------------
    // Fields
    // -------------------------------------------------------------------------

    /// Validate `raw` for the field at dotted `path` and commit the outcome.
    ///
    /// An invalid value is not stored; it is recorded as the field's issue
    /// and returned.
    pub fn set_field(
        &mut self,
        kind: ClauseKind,
        index: usize,
        path: &str,
        raw: &str,
    ) -> Result<FieldOutcome, SessionError> {
        let form = self.form(kind, index)?;
        let segments: Vec<&str> = path.split('.').collect();
        let field = form
            .locate(&self.resolver(), &segments)?
            .ok_or_else(|| SessionError::UnknownField {
                field: path.to_string(),
                option: form.title.clone(),
            })?;
        if let Some(reason) = field.input.inert_reason() {
            return Err(SessionError::NotEditable {
                field: path.to_string(),
                reason,
            });
        }

        let outcome = field.input.validate(raw);
        let fixed = self.nested_fixed_values(&form, &segments)?;
        tracing::debug!(%kind, index, field = %path, valid = outcome.error().is_none(), "Set field");
        self.commit(|draft| {
            let draft = fixed.iter().fold(draft.clone(), |draft, (fixed_path, value)| {
                draft.set_field_outcome(kind, index, fixed_path, &FieldOutcome::Value(value.clone()))
            });
            draft.set_field_outcome(kind, index, &segments, &outcome)
        });
        Ok(outcome)
    }

    /// Fixed values of every nested sub-form `segments` passes through,
    /// keyed by full path.
    fn nested_fixed_values(
        &self,
        form: &PropertiesTable,
        segments: &[&str],
    ) -> Result<Vec<(Vec<String>, Value)>, SessionError> {
        let resolver = self.resolver();
        let mut found = Vec::new();
        let mut table = form.clone();

        for depth in 0..segments.len().saturating_sub(1) {
            let Some(Control::Object(object)) = table.field(segments[depth]).map(|f| &f.input.control) else {
                break;
            };
            let nested = object.table(&resolver)?;
            for (key, value) in nested.fixed_values() {
                let mut path: Vec<String> = segments[..=depth].iter().map(|s| s.to_string()).collect();
                path.push(key);
                found.push((path, value));
            }
            table = nested;
        }
        Ok(found)
    }

    /// Clear the field at `path`; a required field is then marked missing.
    pub fn clear_field(&mut self, kind: ClauseKind, index: usize, path: &str) -> Result<FieldOutcome, SessionError> {
        self.set_field(kind, index, path, "")
    }

    /// Required top-level fields of slot `index` that have no value.
    pub fn missing_required(&self, kind: ClauseKind, index: usize) -> Result<Vec<String>, SessionError> {
        let form = self.form(kind, index)?;
        let slot = self
            .draft()?
            .clause(kind, index)
            .ok_or(SessionError::SlotOutOfRange { index })?;
        Ok(form.missing_required(&slot.values))
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    pub fn document(&self) -> PolicyDocument {
        PolicyDocument::from_drafts(self.policies.drafts())
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, RenderError> {
        self.document().render(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c7n_form::FieldError;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn catalog() -> Arc<SchemaCatalog> {
        let catalog = SchemaCatalog::from_value(json!({
            "definitions": {
                "resources": {
                    "aws.ec2": {
                        "actions": {
                            "stop": {
                                "type": "object",
                                "required": ["type"],
                                "properties": {"type": {"enum": ["stop"]}, "hibernate": {"type": "boolean"}}
                            }
                        },
                        "filters": {
                            "instance-age": {
                                "type": "object",
                                "properties": {
                                    "type": {"enum": ["instance-age"]},
                                    "days": {"type": "number", "minimum": 0},
                                    "op": {"type": "string", "enum": ["less-than", "greater-than"]}
                                }
                            }
                        }
                    },
                    "aws.s3": {"actions": {}, "filters": {}}
                },
                "actions": {
                    "tag": {
                        "type": "object",
                        "required": ["type", "key"],
                        "properties": {
                            "type": {"enum": ["tag"]},
                            "key": {"type": "string"},
                            "value": {"type": "string"},
                            "meta": {"type": "object", "properties": {"owner": {"type": "string", "pattern": "^[a-z]+$"}}},
                            "transport": {
                                "type": "object",
                                "properties": {"type": {"enum": ["sqs"]}, "queue": {"type": "string"}}
                            },
                            "choice": {"oneOf": [{"type": "string"}, {"type": "number"}]}
                        }
                    }
                },
                "filters": {}
            }
        }))
        .unwrap();
        Arc::new(catalog)
    }

    fn ec2_session() -> Session {
        let mut session = Session::new(catalog());
        session.set_resource("aws.ec2").unwrap();
        session
    }

    fn values(session: &Session, kind: ClauseKind, index: usize) -> Value {
        Value::Object(session.current().unwrap().clause(kind, index).unwrap().values.clone())
    }

    #[test]
    fn test_choose_sets_fixed_values() {
        let mut session = ec2_session();
        session.choose(ClauseKind::Action, 0, "tag").unwrap();
        assert_eq!(values(&session, ClauseKind::Action, 0), json!({"type": "tag"}));
        assert_eq!(session.missing_required(ClauseKind::Action, 0).unwrap(), vec!["key".to_string()]);
    }

    #[test]
    fn test_set_field_validates_and_tracks_issues() {
        let mut session = ec2_session();
        session.choose(ClauseKind::Filter, 0, "instance-age").unwrap();

        let outcome = session.set_field(ClauseKind::Filter, 0, "days", "-1").unwrap();
        assert!(matches!(outcome, FieldOutcome::Invalid(FieldError::BelowMinimum { .. })));
        let slot = session.current().unwrap().clause(ClauseKind::Filter, 0).unwrap();
        assert!(slot.issues.contains_key("days"));
        assert!(!slot.values.contains_key("days"));

        session.set_field(ClauseKind::Filter, 0, "days", "30").unwrap();
        session.set_field(ClauseKind::Filter, 0, "op", "greater-than").unwrap();
        let slot = session.current().unwrap().clause(ClauseKind::Filter, 0).unwrap();
        assert!(slot.issues.is_empty());
        assert_eq!(
            values(&session, ClauseKind::Filter, 0),
            json!({"type": "instance-age", "days": 30, "op": "greater-than"})
        );
    }

    #[test]
    fn test_nested_fields_and_clearing() {
        let mut session = ec2_session();
        session.choose(ClauseKind::Action, 0, "tag").unwrap();
        session.set_field(ClauseKind::Action, 0, "key", "Owner").unwrap();
        session.set_field(ClauseKind::Action, 0, "meta.owner", "ops").unwrap();
        assert_eq!(
            values(&session, ClauseKind::Action, 0),
            json!({"type": "tag", "key": "Owner", "meta": {"owner": "ops"}})
        );

        session.clear_field(ClauseKind::Action, 0, "meta.owner").unwrap();
        assert_eq!(values(&session, ClauseKind::Action, 0), json!({"type": "tag", "key": "Owner"}));

        let outcome = session.clear_field(ClauseKind::Action, 0, "key").unwrap();
        assert_eq!(outcome, FieldOutcome::Invalid(FieldError::MissingRequired));
        assert_eq!(values(&session, ClauseKind::Action, 0), json!({"type": "tag"}));
    }

    #[test]
    fn test_nested_edit_sets_nested_fixed_values() {
        let mut session = ec2_session();
        session.choose(ClauseKind::Action, 0, "tag").unwrap();
        session.set_field(ClauseKind::Action, 0, "transport.queue", "mailer").unwrap();
        assert_eq!(
            values(&session, ClauseKind::Action, 0),
            json!({"type": "tag", "transport": {"type": "sqs", "queue": "mailer"}})
        );
        assert!(matches!(
            session.set_field(ClauseKind::Action, 0, "transport.type", "sns"),
            Err(SessionError::NotEditable { .. })
        ));
    }

    #[test]
    fn test_field_rejections() {
        let mut session = ec2_session();
        session.choose(ClauseKind::Action, 0, "tag").unwrap();

        assert!(matches!(
            session.set_field(ClauseKind::Action, 0, "nope", "x"),
            Err(SessionError::UnknownField { .. })
        ));
        assert!(matches!(
            session.set_field(ClauseKind::Action, 0, "type", "mark"),
            Err(SessionError::NotEditable { reason: FieldError::ReadOnly, .. })
        ));
        assert!(matches!(
            session.set_field(ClauseKind::Action, 0, "meta", "x"),
            Err(SessionError::NotEditable { reason: FieldError::NestedForm, .. })
        ));
        assert!(matches!(
            session.set_field(ClauseKind::Action, 0, "choice", "x"),
            Err(SessionError::NotEditable { reason: FieldError::Unsupported(_), .. })
        ));
        assert!(matches!(
            session.set_field(ClauseKind::Action, 3, "key", "x"),
            Err(SessionError::SlotOutOfRange { index: 3 })
        ));
    }

    #[test]
    fn test_clause_exclusion() {
        let mut session = ec2_session();
        session.choose(ClauseKind::Action, 0, "tag").unwrap();
        let index = session.add_clause(ClauseKind::Action).unwrap();
        assert_eq!(index, 1);

        let choices = session.options(ClauseKind::Action, index).unwrap();
        let tag = choices.iter().find(|c| c.option.label == "tag").unwrap();
        assert!(!tag.selectable);

        assert!(matches!(
            session.choose(ClauseKind::Action, index, "tag"),
            Err(SessionError::AlreadyChosen { .. })
        ));
        session.choose(ClauseKind::Action, index, "stop").unwrap();
        assert!(matches!(
            session.choose(ClauseKind::Action, 0, "missing"),
            Err(SessionError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_resource_exclusion_across_policies() {
        let mut session = ec2_session();
        session.set_name("first").unwrap();
        assert_eq!(session.new_policy(), 1);

        let ec2 = session
            .resource_choices()
            .into_iter()
            .find(|c| c.option.label == "ec2")
            .unwrap();
        assert!(!ec2.selectable);
        assert!(matches!(session.set_resource("ec2"), Err(SessionError::AlreadyChosen { .. })));
        assert!(matches!(session.set_resource("aws.rds"), Err(SessionError::UnknownResource { .. })));

        session.set_resource("s3").unwrap();
        assert_eq!(session.document().policies.len(), 2);

        session.select_policy(0).unwrap();
        session.drop_policy();
        assert_eq!(session.document().policies[0].resource, "s3");
        assert!(session.select_policy(4).is_err());
    }

    #[test]
    fn test_commands_need_a_resource() {
        let mut session = Session::new(catalog());
        assert!(matches!(session.set_name("x"), Err(SessionError::NoResource)));
        assert!(matches!(session.add_clause(ClauseKind::Filter), Err(SessionError::NoResource)));
        assert_eq!(session.document(), PolicyDocument::default());
    }

    #[test]
    fn test_delete_clause() {
        let mut session = ec2_session();
        session.choose(ClauseKind::Action, 0, "tag").unwrap();
        session.delete_clause(ClauseKind::Action, 0).unwrap();
        assert_eq!(session.current().unwrap().actions, vec![None]);
        assert!(session.delete_clause(ClauseKind::Action, 2).is_err());
    }
}
