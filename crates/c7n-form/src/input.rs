//! Input specifications and field validation.
//!
//! An [`InputSpec`] says which control collects a parameter and how raw text
//! from that control becomes a typed value. Validation never fails the
//! caller: it yields a [`FieldOutcome`], and an invalid value is simply not
//! stored.

use c7n_catalog::Schema;
use regex::Regex;
use serde_json::{Number, Value};
use std::fmt;

// =============================================================================
// CONTROLS
// =============================================================================

/// A compiled catalog `pattern`, matched against the whole value.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a catalog pattern.
    ///
    /// Returns `None` (and logs) when the pattern is not valid for the
    /// `regex` crate; the field is then validated without it.
    pub fn compile(source: &str) -> Option<Self> {
        match Regex::new(&format!("^(?:{})$", source)) {
            Ok(regex) => Some(Self {
                source: source.to_string(),
                regex,
            }),
            Err(err) => {
                tracing::warn!(pattern = %source, error = %err, "Ignoring invalid schema pattern");
                None
            }
        }
    }

    /// The pattern as written in the catalog.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when the whole of `text` matches.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A nested object whose properties are configured in a sub-form.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInput {
    /// Title of the sub-form (the property name).
    pub title: String,
    /// Object schema, `$ref` hops already followed.
    pub schema: Schema,
}

/// Schema shapes the builder renders as inert placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedShape {
    /// `type` lists several names.
    MultipleTypes(Vec<String>),
    /// `oneOf` alternatives.
    OneOf,
    /// Array whose items are not strings or numbers.
    ArrayItems(String),
    /// A scalar `type` name the builder does not know.
    UnknownType(String),
    /// No recognizable keyword at all.
    Unknown,
}

impl fmt::Display for UnsupportedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedShape::MultipleTypes(types) => write!(f, "multiple types ({})", types.join(", ")),
            UnsupportedShape::OneOf => write!(f, "oneOf"),
            UnsupportedShape::ArrayItems(items) => write!(f, "array of {}", items),
            UnsupportedShape::UnknownType(ty) => write!(f, "{}", ty),
            UnsupportedShape::Unknown => write!(f, "unknown"),
        }
    }
}

/// The control presented for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Free text; `multiline` collects one value per line.
    FreeText {
        pattern: Option<Pattern>,
        multiline: bool,
    },
    /// Pick from the schema's `enum`; `multiline` collects one choice per line.
    Choice { choices: Vec<Value>, multiline: bool },
    /// Decimal number within optional bounds.
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
        multiline: bool,
    },
    /// `true` or `false`.
    Boolean,
    /// Configured through a nested properties table.
    Object(ObjectInput),
    /// Single-value enum: set automatically, not editable.
    Fixed(Value),
    /// Inert placeholder; never produces a value.
    Unsupported(UnsupportedShape),
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why a raw input was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("a value is required")]
    MissingRequired,

    #[error("value does not match pattern {pattern}")]
    PatternMismatch { pattern: String },

    #[error("'{input}' is not a number")]
    NotANumber { input: String },

    #[error("{value} is below the minimum of {minimum}")]
    BelowMinimum { value: f64, minimum: f64 },

    #[error("{value} is above the maximum of {maximum}")]
    AboveMaximum { value: f64, maximum: f64 },

    #[error("'{input}' is not one of the allowed values")]
    NotAChoice { input: String },

    #[error("'{input}' is not true or false")]
    NotABoolean { input: String },

    #[error("line {line}: {error}")]
    Line { line: usize, error: Box<FieldError> },

    #[error("value is fixed by the schema")]
    ReadOnly,

    #[error("value is configured through its nested properties")]
    NestedForm,

    #[error("unsupported schema: {0}")]
    Unsupported(UnsupportedShape),
}

/// Result of validating one raw input.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Valid; store this value.
    Value(Value),
    /// Valid and empty; remove any stored value.
    Unset,
    /// Rejected; remove any stored value and mark the field.
    Invalid(FieldError),
}

impl FieldOutcome {
    /// The value to store, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldOutcome::Value(value) => Some(value),
            FieldOutcome::Unset | FieldOutcome::Invalid(_) => None,
        }
    }

    /// The rejection, if any.
    pub fn error(&self) -> Option<&FieldError> {
        match self {
            FieldOutcome::Invalid(error) => Some(error),
            FieldOutcome::Value(_) | FieldOutcome::Unset => None,
        }
    }
}

// =============================================================================
// INPUT SPEC
// =============================================================================

/// Which control collects a parameter, and whether it is required.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub required: bool,
    pub control: Control,
}

impl InputSpec {
    pub fn new(control: Control, required: bool) -> Self {
        Self { required, control }
    }

    /// True for controls that accept raw text.
    pub fn is_editable(&self) -> bool {
        matches!(
            self.control,
            Control::FreeText { .. } | Control::Choice { .. } | Control::Number { .. } | Control::Boolean
        )
    }

    /// The automatically set value of a [`Control::Fixed`] input.
    pub fn fixed_value(&self) -> Option<&Value> {
        match &self.control {
            Control::Fixed(value) => Some(value),
            _ => None,
        }
    }

    /// Why a non-editable control rejects every input.
    pub fn inert_reason(&self) -> Option<FieldError> {
        match &self.control {
            Control::Fixed(_) => Some(FieldError::ReadOnly),
            Control::Object(_) => Some(FieldError::NestedForm),
            Control::Unsupported(shape) => Some(FieldError::Unsupported(shape.clone())),
            _ => None,
        }
    }

    /// Validate and coerce raw text from the control.
    pub fn validate(&self, raw: &str) -> FieldOutcome {
        match &self.control {
            Control::FreeText { pattern, multiline } => {
                self.collect(raw, *multiline, |text| check_text(text, pattern.as_ref()))
            }
            Control::Choice { choices, multiline } => {
                self.collect(raw, *multiline, |text| check_choice(text, choices))
            }
            Control::Number {
                minimum,
                maximum,
                multiline,
            } => self.collect(raw, *multiline, |text| check_number(text, *minimum, *maximum)),
            Control::Boolean => self.collect(raw, false, check_boolean),
            Control::Fixed(_) => FieldOutcome::Invalid(FieldError::ReadOnly),
            Control::Object(_) => FieldOutcome::Invalid(FieldError::NestedForm),
            Control::Unsupported(shape) => FieldOutcome::Invalid(FieldError::Unsupported(shape.clone())),
        }
    }

    /// Prompt shown inside the control.
    pub fn placeholder(&self) -> &'static str {
        match &self.control {
            Control::FreeText { multiline: true, .. } => "Enter one value per line...",
            Control::FreeText { multiline: false, .. } => "Value...",
            Control::Choice { multiline: true, .. } => "Choose one per line...",
            Control::Choice { multiline: false, .. } => "Choose one...",
            Control::Number { multiline: true, .. } => "Enter one number per line...",
            Control::Number { multiline: false, .. } => "Number...",
            Control::Boolean => "true / false",
            Control::Object(_) => "Configure",
            Control::Fixed(_) => "",
            Control::Unsupported(_) => "",
        }
    }

    /// Constraint hint shown under the control.
    pub fn helper_text(&self) -> Option<String> {
        match &self.control {
            Control::FreeText {
                pattern: Some(pattern),
                ..
            } => Some(format!("Pattern: {}", pattern.source())),
            Control::Number {
                minimum, maximum, ..
            } => match (minimum, maximum) {
                (Some(min), Some(max)) => Some(format!("Min: {}, max: {}", min, max)),
                (Some(min), None) => Some(format!("Min: {}", min)),
                (None, Some(max)) => Some(format!("Max: {}", max)),
                (None, None) => None,
            },
            Control::Choice { choices, .. } => Some(
                choices
                    .iter()
                    .map(choice_label)
                    .collect::<Vec<_>>()
                    .join(" | "),
            ),
            _ => None,
        }
    }

    fn collect(
        &self,
        raw: &str,
        multiline: bool,
        check: impl Fn(&str) -> Result<Value, FieldError>,
    ) -> FieldOutcome {
        if !multiline {
            let text = raw.trim();
            if text.is_empty() {
                return self.empty();
            }
            return match check(text) {
                Ok(value) => FieldOutcome::Value(value),
                Err(error) => FieldOutcome::Invalid(error),
            };
        }

        let mut items = Vec::new();
        for (index, line) in raw.lines().enumerate() {
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            match check(text) {
                Ok(value) => items.push(value),
                Err(error) => {
                    return FieldOutcome::Invalid(FieldError::Line {
                        line: index + 1,
                        error: Box::new(error),
                    });
                }
            }
        }

        if items.is_empty() {
            self.empty()
        } else {
            FieldOutcome::Value(Value::Array(items))
        }
    }

    fn empty(&self) -> FieldOutcome {
        if self.required {
            FieldOutcome::Invalid(FieldError::MissingRequired)
        } else {
            FieldOutcome::Unset
        }
    }
}

/// Display text of an enum choice.
pub fn choice_label(choice: &Value) -> String {
    match choice {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn check_text(text: &str, pattern: Option<&Pattern>) -> Result<Value, FieldError> {
    match pattern {
        Some(pattern) if !pattern.matches(text) => Err(FieldError::PatternMismatch {
            pattern: pattern.source().to_string(),
        }),
        _ => Ok(Value::String(text.to_string())),
    }
}

fn check_choice(text: &str, choices: &[Value]) -> Result<Value, FieldError> {
    choices
        .iter()
        .find(|choice| choice_label(choice) == text)
        .cloned()
        .ok_or_else(|| FieldError::NotAChoice {
            input: text.to_string(),
        })
}

fn check_boolean(text: &str) -> Result<Value, FieldError> {
    match text {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        other => Err(FieldError::NotABoolean {
            input: other.to_string(),
        }),
    }
}

fn check_number(text: &str, minimum: Option<f64>, maximum: Option<f64>) -> Result<Value, FieldError> {
    let not_a_number = || FieldError::NotANumber {
        input: text.to_string(),
    };
    if !is_decimal(text) {
        return Err(not_a_number());
    }

    let value: f64 = text.parse().map_err(|_| not_a_number())?;
    if let Some(minimum) = minimum {
        if value < minimum {
            return Err(FieldError::BelowMinimum { value, minimum });
        }
    }
    if let Some(maximum) = maximum {
        if value > maximum {
            return Err(FieldError::AboveMaximum { value, maximum });
        }
    }

    match text.parse::<i64>() {
        Ok(integer) => Ok(Value::from(integer)),
        Err(_) => Number::from_f64(value).map(Value::Number).ok_or_else(not_a_number),
    }
}

/// Optionally signed decimal: `3`, `-2.5`, `.5`, `+10.`; no exponent.
fn is_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty()) && all_digits(whole) && all_digits(fraction)
}
