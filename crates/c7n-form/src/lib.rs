//! # c7n-form
//!
//! Schema-driven parameter inputs.
//!
//! [`InputResolver`] interprets one property's schema fragment and returns an
//! [`InputSpec`]: the control to present plus the validation that turns raw
//! text into a typed value. [`PropertiesTable`] resolves every property of a
//! clause (or nested object) schema.

pub mod input;
pub mod resolver;
pub mod table;

pub use input::{
    Control, FieldError, FieldOutcome, InputSpec, ObjectInput, Pattern, UnsupportedShape, choice_label,
};
pub use resolver::InputResolver;
pub use table::{FieldSpec, PropertiesTable};
