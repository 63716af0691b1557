//! # c7n-draft
//!
//! Policy documents under construction.
//!
//! - [`PolicyDraft`]: one policy (resource type, name, action and filter
//!   slots) with pure copy-on-write transitions
//! - [`PolicySet`]: several drafts side by side, one resource type each
//! - [`Session`]: catalog-aware editing commands over a [`PolicySet`]
//! - [`PolicyDocument`]: the `{policies: [...]}` projection, rendered as YAML
//!   or pretty JSON

pub mod draft;
pub mod error;
pub mod render;
pub mod session;
pub mod set;
pub mod slots;

pub use draft::{ClauseSlot, PolicyDraft};
pub use error::{RenderError, SessionError};
pub use render::{PolicyDocument, PolicyEntry, render};
pub use session::Session;
pub use set::PolicySet;
pub use slots::Choice;
