//! Shared types for the Cloud Custodian policy builder.
//!
//! Every other crate in the workspace depends on this one for:
//! - [`ClauseKind`]: the two clause families (actions and filters)
//! - [`OutputFormat`]: the two textual encodings of a rendered policy document
//! - [`value`]: copy-on-write helpers over parameter value maps
//! - [`config`]: the YAML configuration file (`c7n-builder.yaml`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod config;
pub mod value;

pub use config::{BuilderConfig, CatalogConfig, ConfigError, LoggingConfig, OutputConfig};
pub use value::{ValueMap, is_empty_value, remove_path, upsert, upsert_path};

/// The two clause families attached to a resource policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClauseKind {
    /// An action clause (`actions:` in the policy).
    Action,
    /// A filter clause (`filters:` in the policy).
    Filter,
}

impl ClauseKind {
    /// Both kinds, in the order they appear in a rendered policy.
    pub const ALL: [ClauseKind; 2] = [ClauseKind::Action, ClauseKind::Filter];

    /// The plural key used by the catalog and the rendered policy.
    pub fn plural(self) -> &'static str {
        match self {
            ClauseKind::Action => "actions",
            ClauseKind::Filter => "filters",
        }
    }

    /// The key of the shared documentation section for this kind.
    pub fn common_docs_key(self) -> &'static str {
        match self {
            ClauseKind::Action => "common_actions",
            ClauseKind::Filter => "common_filters",
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseKind::Action => write!(f, "action"),
            ClauseKind::Filter => write!(f, "filter"),
        }
    }
}

impl FromStr for ClauseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "action" | "actions" => Ok(ClauseKind::Action),
            "filter" | "filters" => Ok(ClauseKind::Filter),
            other => Err(format!("unknown clause kind '{}' (expected action or filter)", other)),
        }
    }
}

/// Textual encoding of a rendered policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Block-style YAML.
    #[default]
    Yaml,
    /// Pretty-printed JSON with 2-space indentation.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected yaml or json)", other)),
        }
    }
}

/// The final dot-delimited segment of a qualified name (`aws.ec2` -> `ec2`).
pub fn local_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("aws.ec2"), "ec2");
        assert_eq!(local_name("aws.common.invoke-lambda"), "invoke-lambda");
        assert_eq!(local_name("notify"), "notify");
        assert_eq!(local_name(""), "");
    }

    #[test]
    fn test_clause_kind_parse() {
        assert_eq!("action".parse::<ClauseKind>().unwrap(), ClauseKind::Action);
        assert_eq!("Filters".parse::<ClauseKind>().unwrap(), ClauseKind::Filter);
        assert!("mode".parse::<ClauseKind>().is_err());
        assert_eq!(ClauseKind::Filter.plural(), "filters");
        assert_eq!(ClauseKind::Action.common_docs_key(), "common_actions");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("toml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Yaml);
    }
}
