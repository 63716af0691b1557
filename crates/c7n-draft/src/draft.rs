//! Policy drafts and their transitions.
//!
//! A [`PolicyDraft`] is an immutable snapshot. Every transition borrows the
//! current draft and returns a new one, so a snapshot held elsewhere (for
//! example by an in-flight render) never observes a half-applied update.

use std::collections::BTreeMap;

use c7n_catalog::{ClauseOption, ResourceOption};
use c7n_core::{ClauseKind, ValueMap, upsert, upsert_path};
use c7n_form::{FieldError, FieldOutcome};
use serde_json::Value;

use crate::slots::{self, Choice};

/// A configured action or filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseSlot {
    pub option: ClauseOption,
    /// Parameter values; keys with empty values are never stored.
    pub values: ValueMap,
    /// Inline validation markers keyed by dotted field path.
    pub issues: BTreeMap<String, FieldError>,
}

impl ClauseSlot {
    /// A freshly chosen option with no values.
    pub fn new(option: ClauseOption) -> Self {
        Self {
            option,
            values: ValueMap::new(),
            issues: BTreeMap::new(),
        }
    }
}

/// One policy under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDraft {
    /// `None` is the empty state: nothing is rendered for this draft.
    pub resource: Option<ResourceOption>,
    pub name: String,
    pub actions: Vec<Option<ClauseSlot>>,
    pub filters: Vec<Option<ClauseSlot>>,
}

impl Default for PolicyDraft {
    fn default() -> Self {
        Self {
            resource: None,
            name: String::new(),
            actions: slots::placeholder(),
            filters: slots::placeholder(),
        }
    }
}

impl PolicyDraft {
    /// Default name for a policy on `resource`.
    pub fn default_name(resource: &ResourceOption) -> String {
        format!("My {} policy", resource.label)
    }

    pub fn is_empty(&self) -> bool {
        self.resource.is_none()
    }

    pub fn clauses(&self, kind: ClauseKind) -> &[Option<ClauseSlot>] {
        match kind {
            ClauseKind::Action => &self.actions,
            ClauseKind::Filter => &self.filters,
        }
    }

    /// The populated slot at `index`, if any.
    pub fn clause(&self, kind: ClauseKind, index: usize) -> Option<&ClauseSlot> {
        self.clauses(kind).get(index).and_then(Option::as_ref)
    }

    /// Populated slots of `kind`, in slot order.
    pub fn populated(&self, kind: ClauseKind) -> impl Iterator<Item = &ClauseSlot> {
        self.clauses(kind).iter().flatten()
    }

    pub fn can_add_clause(&self, kind: ClauseKind) -> bool {
        !self.is_empty() && slots::can_add(self.clauses(kind))
    }

    /// The clause options for slot `index`, with labels held by sibling
    /// slots marked non-selectable.
    pub fn clause_choices(&self, kind: ClauseKind, index: usize, options: &[ClauseOption]) -> Vec<Choice<ClauseOption>> {
        let chosen: Vec<&str> = self
            .clauses(kind)
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .filter_map(|(_, slot)| slot.as_ref())
            .map(|slot| slot.option.label.as_str())
            .collect();
        slots::mark_chosen(options, &chosen)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Start over on `resource`, or return to the empty state with `None`.
    #[must_use]
    pub fn select_resource(&self, resource: Option<ResourceOption>) -> Self {
        match resource {
            Some(resource) => Self {
                name: Self::default_name(&resource),
                resource: Some(resource),
                actions: slots::placeholder(),
                filters: slots::placeholder(),
            },
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn set_name(&self, name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            ..self.clone()
        }
    }

    /// Open a placeholder slot; no-op while one is already open.
    #[must_use]
    pub fn add_clause_slot(&self, kind: ClauseKind) -> Self {
        self.with_clauses(kind, slots::add(self.clauses(kind)))
    }

    /// Put `option` into slot `index` with an empty value map, or delete the
    /// slot with `None`.
    #[must_use]
    pub fn set_clause_at(&self, kind: ClauseKind, index: usize, option: Option<ClauseOption>) -> Self {
        let slot = option.map(ClauseSlot::new);
        self.with_clauses(kind, slots::set_at(self.clauses(kind), index, slot))
    }

    #[must_use]
    pub fn delete_clause_at(&self, kind: ClauseKind, index: usize) -> Self {
        self.with_clauses(kind, slots::delete_at(self.clauses(kind), index))
    }

    /// Upsert one top-level parameter; an empty value removes the key.
    #[must_use]
    pub fn set_clause_value(&self, kind: ClauseKind, index: usize, property: &str, value: Value) -> Self {
        self.update_slot(kind, index, |slot| ClauseSlot {
            values: upsert(&slot.values, property, value),
            ..slot.clone()
        })
    }

    /// Apply a validation outcome to the field at `path`.
    ///
    /// A value is upserted through nested objects; an unset or invalid
    /// outcome removes it. The field's issue marker follows the outcome.
    #[must_use]
    pub fn set_field_outcome<S: AsRef<str>>(
        &self,
        kind: ClauseKind,
        index: usize,
        path: &[S],
        outcome: &FieldOutcome,
    ) -> Self {
        let key = path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(".");
        let value = outcome.value().cloned().unwrap_or(Value::Null);

        self.update_slot(kind, index, |slot| {
            let mut issues = slot.issues.clone();
            match outcome.error() {
                Some(error) => {
                    issues.insert(key.clone(), error.clone());
                }
                None => {
                    issues.remove(&key);
                }
            }
            ClauseSlot {
                option: slot.option.clone(),
                values: upsert_path(&slot.values, path, value.clone()),
                issues,
            }
        })
    }

    fn with_clauses(&self, kind: ClauseKind, clauses: Vec<Option<ClauseSlot>>) -> Self {
        let mut next = self.clone();
        match kind {
            ClauseKind::Action => next.actions = clauses,
            ClauseKind::Filter => next.filters = clauses,
        }
        next
    }

    fn update_slot(&self, kind: ClauseKind, index: usize, update: impl FnOnce(&ClauseSlot) -> ClauseSlot) -> Self {
        match self.clause(kind, index) {
            Some(slot) => {
                let slot = update(slot);
                self.with_clauses(kind, slots::set_at(self.clauses(kind), index, Some(slot)))
            }
            None => self.clone(),
        }
    }
}
