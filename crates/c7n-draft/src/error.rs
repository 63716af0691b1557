//! Error types for editing sessions and rendering.

use c7n_catalog::CatalogError;
use c7n_core::ClauseKind;
use c7n_form::FieldError;
use thiserror::Error;

/// Errors raised by [`crate::Session`] operations.
///
/// `Catalog` is fatal: the reference catalog is corrupt. Every other variant
/// rejects one command and leaves the session unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("no resource type selected for this policy")]
    NoResource,

    #[error("unknown resource type: {resource}")]
    UnknownResource { resource: String },

    #[error("unknown {kind} '{option}' for {resource}")]
    UnknownOption {
        kind: ClauseKind,
        option: String,
        resource: String,
    },

    #[error("'{label}' is already chosen in another slot")]
    AlreadyChosen { label: String },

    #[error("no slot at index {index}")]
    SlotOutOfRange { index: usize },

    #[error("no field '{field}' on {option}")]
    UnknownField { field: String, option: String },

    #[error("field '{field}' cannot be edited: {reason}")]
    NotEditable { field: String, reason: FieldError },
}

/// Errors raised while encoding a policy document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
