//! Several policies edited side by side.

use c7n_catalog::ResourceOption;

use crate::draft::PolicyDraft;
use crate::slots::{self, Choice};

/// Ordered policy slots, one resource type per populated slot.
///
/// Shares the clause-slot rules: at most one trailing placeholder, deletion
/// splices, and the sequence never becomes empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySet {
    policies: Vec<Option<PolicyDraft>>,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            policies: slots::placeholder(),
        }
    }
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Option<PolicyDraft>] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts().next().is_none()
    }

    pub fn get(&self, index: usize) -> Option<&PolicyDraft> {
        self.policies.get(index).and_then(Option::as_ref)
    }

    /// Populated drafts, in slot order.
    pub fn drafts(&self) -> impl Iterator<Item = &PolicyDraft> {
        self.policies.iter().flatten()
    }

    pub fn can_add(&self) -> bool {
        slots::can_add(&self.policies)
    }

    #[must_use]
    pub fn add_slot(&self) -> Self {
        Self {
            policies: slots::add(&self.policies),
        }
    }

    /// Start a fresh draft for `resource` in slot `index`, or delete the
    /// slot with `None`.
    #[must_use]
    pub fn select_resource(&self, index: usize, resource: Option<ResourceOption>) -> Self {
        let draft = resource.map(|resource| PolicyDraft::default().select_resource(Some(resource)));
        Self {
            policies: slots::set_at(&self.policies, index, draft),
        }
    }

    /// Replace the populated draft at `index` with `update(draft)`.
    #[must_use]
    pub fn update(&self, index: usize, update: impl FnOnce(&PolicyDraft) -> PolicyDraft) -> Self {
        match self.get(index) {
            Some(draft) => Self {
                policies: slots::set_at(&self.policies, index, Some(update(draft))),
            },
            None => self.clone(),
        }
    }

    #[must_use]
    pub fn delete_at(&self, index: usize) -> Self {
        Self {
            policies: slots::delete_at(&self.policies, index),
        }
    }

    /// Labels of the resource types chosen by slots other than `index`.
    pub fn chosen_resources(&self, index: usize) -> Vec<&str> {
        self.policies
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .filter_map(|(_, draft)| draft.as_ref())
            .filter_map(|draft| draft.resource.as_ref())
            .map(|resource| resource.label.as_str())
            .collect()
    }

    /// Resource options for slot `index`, with sibling choices greyed out.
    pub fn resource_choices(&self, index: usize, resources: &[ResourceOption]) -> Vec<Choice<ResourceOption>> {
        slots::mark_chosen(resources, &self.chosen_resources(index))
    }
}
