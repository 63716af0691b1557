//! Error types for catalog access.
//!
//! Every variant means the reference catalog is unusable for the requested
//! lookup. None of them are user-input problems.

use thiserror::Error;

/// Errors raised while reading or querying the reference catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required top-level section is missing.
    #[error("catalog is missing required section '{section}'")]
    MissingSection { section: String },

    /// The resource type is not in the catalog.
    #[error("resource type not found in catalog: {resource}")]
    NotFound { resource: String },

    /// A `$ref` pointer names a location that does not exist.
    #[error("dangling reference '{pointer}': no entry for segment '{segment}'")]
    DanglingReference { pointer: String, segment: String },

    /// A `$ref` chain did not terminate.
    #[error("reference chain starting at '{pointer}' does not terminate")]
    ReferenceCycle { pointer: String },

    /// A schema fragment has the wrong shape (e.g. `required` is not a list).
    #[error("malformed schema at '{location}': {source}")]
    MalformedSchema {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}
