// Speaker assignment checks

use anyhow::{Context, Result};
use clap::Subcommand;
use std::collections::BTreeMap;

use miseventos_core::{validate_assignments, Assignment, FieldErrors};

use crate::output::{print_errors, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum AssignmentsCommand {
    /// Check a YAML/JSON list of {session_id, speaker_id} pairs
    Check {
        /// Assignment file
        file: String,
    },
}

pub fn run(command: AssignmentsCommand, output: OutputFormat, quiet: bool) -> Result<()> {
    match command {
        AssignmentsCommand::Check { file } => check(&file, output, quiet),
    }
}

fn check(path: &str, output: OutputFormat, quiet: bool) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    let assignments = parse(&content).with_context(|| format!("Failed to parse: {}", path))?;
    let errors = validate_assignments(&assignments);

    if output.is_text() {
        if errors.is_empty() {
            if !quiet {
                println!("{} assignment(s) OK", assignments.len());
            }
        } else {
            for (index, field_errors) in &errors {
                let pair = &assignments[*index];
                eprintln!(
                    "#{} (session {}, speaker {}):",
                    index,
                    or_dash(&pair.session_id),
                    or_dash(&pair.speaker_id)
                );
                print_errors(field_errors);
            }
        }
    } else {
        let report: BTreeMap<String, &FieldErrors> =
            errors.iter().map(|(i, e)| (i.to_string(), e)).collect();
        output.print_value(&report)?;
    }

    if !errors.is_empty() {
        anyhow::bail!("{} of {} assignment(s) have errors", errors.len(), assignments.len());
    }
    Ok(())
}

/// YAML is a superset of JSON, so one parser covers both
fn parse(content: &str) -> Result<Vec<Assignment>> {
    Ok(serde_yaml::from_str(content)?)
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
