//! Session commands.
//!
//! `c7n-builder build <script>` - Replay a script and print the document.
//! `c7n-builder shell` - Run the same commands interactively from stdin.

use anyhow::{Context, Result};
use c7n_core::{ClauseKind, OutputFormat};
use c7n_draft::{Session, SessionError};
use c7n_form::FieldOutcome;
use serde_json::Value;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::Workspace;
use crate::script::{ScriptCommand, parse_line};

/// What a command produced besides a state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Changed,
    /// A field was validated; invalid outcomes are worth reporting.
    Field { path: String, outcome: FieldOutcome },
    /// A slot was opened at this index.
    Opened(usize),
    Show,
    Render(Option<OutputFormat>),
}

/// Apply one command to the session.
pub fn apply(session: &mut Session, command: ScriptCommand) -> Result<Applied, SessionError> {
    match command {
        ScriptCommand::Resource(resource) => session.set_resource(&resource)?,
        ScriptCommand::Name(name) => session.set_name(&name)?,
        ScriptCommand::Add(kind) => return Ok(Applied::Opened(session.add_clause(kind)?)),
        ScriptCommand::Choose { kind, index, option } => session.choose(kind, index, &option)?,
        ScriptCommand::Set {
            kind,
            index,
            field,
            value,
        } => {
            let outcome = session.set_field(kind, index, &field, &value)?;
            return Ok(Applied::Field { path: field, outcome });
        }
        ScriptCommand::Clear { kind, index, field } => {
            let outcome = session.clear_field(kind, index, &field)?;
            return Ok(Applied::Field { path: field, outcome });
        }
        ScriptCommand::Delete { kind, index } => session.delete_clause(kind, index)?,
        ScriptCommand::Policy(index) => session.select_policy(index)?,
        ScriptCommand::NewPolicy => return Ok(Applied::Opened(session.new_policy())),
        ScriptCommand::DropPolicy => session.drop_policy(),
        ScriptCommand::Show => return Ok(Applied::Show),
        ScriptCommand::Render(format) => return Ok(Applied::Render(format)),
    }
    Ok(Applied::Changed)
}

/// Output of a replayed script.
#[derive(Debug, Default)]
pub struct ScriptOutput {
    /// Rendered documents and `show` summaries, in script order.
    pub printed: Vec<String>,
    /// Field validation problems, one line each.
    pub issues: Vec<String>,
}

/// Replay `source` line by line.
///
/// The first rejected command aborts with its line number. When the script
/// never renders, the final document is rendered once at the end.
pub fn run_script(session: &mut Session, source: &str, format: OutputFormat) -> Result<ScriptOutput> {
    let mut output = ScriptOutput::default();
    let mut rendered = false;

    for (number, line) in source.lines().enumerate() {
        let number = number + 1;
        let Some(command) = parse_line(line).with_context(|| format!("line {}: parse error", number))? else {
            continue;
        };

        let applied = apply(session, command).with_context(|| format!("line {}: {}", number, line.trim()))?;
        match applied {
            Applied::Field { path, outcome } => {
                if let Some(error) = outcome.error() {
                    output.issues.push(format!("line {}: {}: {}", number, path, error));
                }
            }
            Applied::Show => output.printed.push(show(session)),
            Applied::Render(requested) => {
                output.printed.push(session.render(requested.unwrap_or(format))?);
                rendered = true;
            }
            Applied::Changed | Applied::Opened(_) => {}
        }
    }

    if !rendered {
        output.printed.push(session.render(format)?);
    }
    Ok(output)
}

/// Replay a script file and print the document.
pub fn build(workspace: &Workspace, script: &Path, format: OutputFormat) -> Result<()> {
    let source = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read session script {:?}", script))?;

    let mut session = workspace.session();
    let output = run_script(&mut session, &source, format)?;

    for issue in &output.issues {
        eprintln!("warning: {}", issue);
    }
    for printed in &output.printed {
        print!("{}", printed);
        if !printed.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// Interactive session over stdin.
///
/// Rejected commands are reported and the session continues; a corrupt
/// catalog ends it.
pub fn shell(workspace: &Workspace, format: OutputFormat) -> Result<()> {
    let mut session = workspace.session();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("c7n-builder shell. Type commands, 'show' to inspect, 'render' to print, Ctrl-D to quit.");
    loop {
        print!("c7n> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("error: {}", err);
                continue;
            }
        };

        match apply(&mut session, command) {
            Ok(Applied::Field { path, outcome }) => match outcome.error() {
                Some(error) => eprintln!("invalid: {}: {}", path, error),
                None => println!("ok"),
            },
            Ok(Applied::Opened(index)) => println!("opened slot {}", index),
            Ok(Applied::Show) => print!("{}", show(&session)),
            Ok(Applied::Render(requested)) => print!("{}", ensure_newline(session.render(requested.unwrap_or(format))?)),
            Ok(Applied::Changed) => println!("ok"),
            Err(SessionError::Catalog(err)) => {
                return Err(err).context("The schema catalog is corrupt");
            }
            Err(err) => eprintln!("error: {}", err),
        }
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Human-readable summary of every policy slot.
pub fn show(session: &Session) -> String {
    let mut out = String::new();
    for (index, slot) in session.policies().slots().iter().enumerate() {
        let marker = if index == session.current_index() { " (current)" } else { "" };
        let Some(draft) = slot else {
            let _ = writeln!(out, "policy {}{}: (empty)", index, marker);
            continue;
        };
        let resource = draft
            .resource
            .as_ref()
            .map(|r| r.qualified_name.as_str())
            .unwrap_or("-");
        let _ = writeln!(out, "policy {}{}: {} \"{}\"", index, marker, resource, draft.name);

        for kind in ClauseKind::ALL {
            let _ = writeln!(out, "   {}:", kind.plural());
            for (slot_index, clause) in draft.clauses(kind).iter().enumerate() {
                let Some(clause) = clause else {
                    let _ = writeln!(out, "      [{}] (empty)", slot_index);
                    continue;
                };
                let values = Value::Object(clause.values.clone());
                let _ = writeln!(out, "      [{}] {} {}", slot_index, clause.option.label, values);
                for (path, error) in &clause.issues {
                    let _ = writeln!(out, "          ! {}: {}", path, error);
                }
                // Forms are resolved for the current policy only.
                if index != session.current_index() {
                    continue;
                }
                if let Ok(missing) = session.missing_required(kind, slot_index) {
                    if !missing.is_empty() {
                        let _ = writeln!(out, "          missing: {}", missing.join(", "));
                    }
                }
            }
        }
    }
    out
}
