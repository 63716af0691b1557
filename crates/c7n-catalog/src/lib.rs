//! # c7n-catalog
//!
//! Read-only access to the Cloud Custodian reference catalog.
//!
//! - [`SchemaCatalog`]: resource types, common clause schemas and `$ref`
//!   resolution over the JSON-Schema document
//! - [`DocsCatalog`]: per-clause documentation text and links
//! - [`OptionProjector`]: deduplicated, sorted option lists for one resource
//!   type and clause kind
//!
//! ```ignore
//! use c7n_catalog::{OptionProjector, SchemaCatalog};
//!
//! let catalog = SchemaCatalog::from_file("c7n-schema.json")?;
//! for option in OptionProjector::new(&catalog).project_actions("aws.ec2")? {
//!     println!("{}", option.label);
//! }
//! ```

pub mod catalog;
pub mod docs;
pub mod error;
pub mod options;
pub mod schema;

pub use catalog::{MAX_REF_HOPS, ResourceSchema, SchemaCatalog};
pub use docs::{DocEntry, DocsCatalog};
pub use error::CatalogError;
pub use options::{
    ClauseOption, ClauseOrigin, Labelled, OptionProjector, ResourceOption, filter_by_label,
};
pub use schema::{Items, Schema, SchemaKind, TypeDecl};
