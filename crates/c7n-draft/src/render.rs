//! Policy document projection and encoding.

use c7n_core::{ClauseKind, OutputFormat, ValueMap, local_name};
use serde::{Deserialize, Serialize};

use crate::draft::PolicyDraft;
use crate::error::RenderError;

/// The rendered tree: `{policies: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub policies: Vec<PolicyEntry>,
}

/// One projected draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub name: String,
    /// Local part of the resource type (`ec2` for `aws.ec2`).
    pub resource: String,
    pub actions: Vec<ValueMap>,
    pub filters: Vec<ValueMap>,
}

impl PolicyDocument {
    /// Project drafts in order, skipping empty ones and placeholder slots.
    pub fn from_drafts<'a>(drafts: impl IntoIterator<Item = &'a PolicyDraft>) -> Self {
        let policies = drafts
            .into_iter()
            .filter_map(|draft| {
                let resource = draft.resource.as_ref()?;
                Some(PolicyEntry {
                    name: draft.name.clone(),
                    resource: local_name(&resource.qualified_name).to_string(),
                    actions: clause_values(draft, ClauseKind::Action),
                    filters: clause_values(draft, ClauseKind::Filter),
                })
            })
            .collect();
        Self { policies }
    }

    /// Encode as pretty JSON (2-space indent) or block-style YAML.
    pub fn render(&self, format: OutputFormat) -> Result<String, RenderError> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }
}

fn clause_values(draft: &PolicyDraft, kind: ClauseKind) -> Vec<ValueMap> {
    draft.populated(kind).map(|slot| slot.values.clone()).collect()
}

/// Project and encode `drafts` in one step.
pub fn render<'a>(drafts: impl IntoIterator<Item = &'a PolicyDraft>, format: OutputFormat) -> Result<String, RenderError> {
    PolicyDocument::from_drafts(drafts).render(format)
}
