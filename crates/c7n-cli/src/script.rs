//! Session script language.
//!
//! One command per line; blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! resource aws.ec2
//! name Stop old instances
//! choose filter 0 instance-age
//! set filter 0 days 30
//! add action
//! choose action 0 notify
//! set action 0 to ops@example.com\nsec@example.com
//! render json
//! ```
//!
//! Trailing text (`name`, `set` values) runs to the end of the line; `\n`
//! inside a value is a line break for list fields.

use anyhow::{Context, Result, bail};
use c7n_core::{ClauseKind, OutputFormat};

/// A parsed script line.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Resource(String),
    Name(String),
    Add(ClauseKind),
    Choose {
        kind: ClauseKind,
        index: usize,
        option: String,
    },
    Set {
        kind: ClauseKind,
        index: usize,
        field: String,
        value: String,
    },
    Clear {
        kind: ClauseKind,
        index: usize,
        field: String,
    },
    Delete {
        kind: ClauseKind,
        index: usize,
    },
    Policy(usize),
    NewPolicy,
    DropPolicy,
    Show,
    Render(Option<OutputFormat>),
}

/// Parse one line; `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = split_word(line);
    let command = match verb {
        "resource" => ScriptCommand::Resource(required_word(rest, "resource type")?.to_string()),
        "name" => ScriptCommand::Name(rest.to_string()),
        "add" => ScriptCommand::Add(parse_kind(required_word(rest, "clause kind")?)?),
        "choose" => {
            let (kind, index, rest) = slot(rest)?;
            ScriptCommand::Choose {
                kind,
                index,
                option: required_word(rest, "option name")?.to_string(),
            }
        }
        "set" => {
            let (kind, index, rest) = slot(rest)?;
            let (field, value) = split_word(rest);
            ScriptCommand::Set {
                kind,
                index,
                field: required_word(field, "field path")?.to_string(),
                value: value.replace("\\n", "\n"),
            }
        }
        "clear" => {
            let (kind, index, rest) = slot(rest)?;
            ScriptCommand::Clear {
                kind,
                index,
                field: required_word(rest, "field path")?.to_string(),
            }
        }
        "delete" => {
            let (kind, index, _) = slot(rest)?;
            ScriptCommand::Delete { kind, index }
        }
        "policy" => ScriptCommand::Policy(parse_index(required_word(rest, "policy index")?)?),
        "new-policy" => ScriptCommand::NewPolicy,
        "drop-policy" => ScriptCommand::DropPolicy,
        "show" => ScriptCommand::Show,
        "render" => match rest {
            "" => ScriptCommand::Render(None),
            format => ScriptCommand::Render(Some(format.parse().map_err(anyhow::Error::msg)?)),
        },
        other => bail!("unknown command '{}'", other),
    };
    Ok(Some(command))
}

/// Split off the first whitespace-delimited word.
fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn required_word<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let (word, _) = split_word(text);
    if word.is_empty() {
        bail!("missing {}", what);
    }
    Ok(word)
}

fn parse_kind(word: &str) -> Result<ClauseKind> {
    word.parse().map_err(anyhow::Error::msg)
}

fn parse_index(word: &str) -> Result<usize> {
    word.parse()
        .with_context(|| format!("'{}' is not a slot index", word))
}

/// `<kind> <index> <rest>`
fn slot(text: &str) -> Result<(ClauseKind, usize, &str)> {
    let (kind, rest) = split_word(text);
    let kind = parse_kind(required_word(kind, "clause kind")?)?;
    let (index, rest) = split_word(rest);
    let index = parse_index(required_word(index, "slot index")?)?;
    Ok((kind, index, rest))
}
