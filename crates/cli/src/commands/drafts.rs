// Draft/sync commands shared by every entity kind

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::Value;

use miseventos_client::{Client, Resource};
use miseventos_core::{DraftList, DraftRecord, Entity, LocalKey, SyncOutcome, ValidationContext};

use super::{parse_key_value, sync_error};
use crate::output::{print_errors, print_field, print_table_header, print_table_row, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum DraftCommand {
    /// Reload persisted records from the backend (drafts are kept)
    Pull,

    /// List local records with their sync state
    List,

    /// Show one record
    Show {
        /// Local key
        key: LocalKey,
    },

    /// Add a new draft
    Add {
        /// Field assignment, e.g. --set title="RustConf" (repeatable)
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
    },

    /// Edit fields of a record
    Edit {
        key: LocalKey,

        /// Field assignment (repeatable)
        #[arg(long = "set", value_parser = parse_key_value, required = true)]
        set: Vec<(String, String)>,
    },

    /// Run validation without contacting the backend
    Validate { key: LocalKey },

    /// Persist a draft
    Create { key: LocalKey },

    /// Push edits of a persisted record
    Update { key: LocalKey },

    /// Create or update, whichever applies
    Push { key: LocalKey },

    /// Delete a record (drafts are only removed locally)
    Delete { key: LocalKey },

    /// Drop a record from the workspace without contacting the backend
    Discard { key: LocalKey },
}

pub async fn run<E: Resource + Default>(
    command: DraftCommand,
    list: &mut DraftList<E>,
    client: &Client,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let ctx = ValidationContext::now();

    match command {
        DraftCommand::Pull => {
            let count = list.load(client).await.map_err(sync_error)?;
            if output.is_text() {
                if !quiet {
                    println!("Loaded {} {}(s)", count, E::KIND);
                }
            } else {
                output.print_value(&serde_json::json!({ "kind": E::KIND, "loaded": count }))?;
            }
            Ok(())
        }
        DraftCommand::List => print_list(list, output),
        DraftCommand::Show { key } => {
            let record = list
                .get(key)
                .with_context(|| format!("No {} with key {}", E::KIND, key))?;
            print_record(record, output)
        }
        DraftCommand::Add { set } => {
            let value = build_draft::<E>(&set).map_err(sync_error)?;
            let key = list.add(value);
            report(output, quiet, key, "added", || format!("Added {} draft {}", E::KIND, key))
        }
        DraftCommand::Edit { key, set } => {
            for (field, value) in &set {
                list.set_field(key, field, value).map_err(sync_error)?;
            }
            let state = list
                .get(key)
                .map(|r| r.state().label())
                .unwrap_or_default();
            report(output, quiet, key, state, || format!("Edited {} {} ({})", E::KIND, key, state))
        }
        DraftCommand::Validate { key } => {
            let errors = list.validate(key, &ctx).map_err(sync_error)?;
            if output.is_text() {
                if errors.is_empty() {
                    println!("{} {} is valid", E::KIND, key);
                } else {
                    println!("{} {} has errors:", E::KIND, key);
                    print_errors(&errors);
                }
            } else {
                output.print_value(&errors)?;
            }
            Ok(())
        }
        DraftCommand::Create { key } => {
            let id = list.create(key, client, &ctx).await.map_err(sync_error)?;
            outcome(output, quiet, key, SyncOutcome::Created(id))
        }
        DraftCommand::Update { key } => {
            let result = list.update(key, client, &ctx).await.map_err(sync_error)?;
            outcome(output, quiet, key, result)
        }
        DraftCommand::Push { key } => {
            let result = list.push(key, client, &ctx).await.map_err(sync_error)?;
            outcome(output, quiet, key, result)
        }
        DraftCommand::Delete { key } => {
            let result = list.delete(key, client).await.map_err(sync_error)?;
            outcome(output, quiet, key, result)
        }
        DraftCommand::Discard { key } => {
            list.remove_local(key).map_err(sync_error)?;
            outcome(output, quiet, key, SyncOutcome::Discarded)
        }
    }
}

/// A default value with every assignment applied; nothing is kept on failure
fn build_draft<E: Entity + Default>(set: &[(String, String)]) -> miseventos_core::Result<E> {
    let mut value = E::default();
    for (field, text) in set {
        value.set_field(field, text)?;
    }
    Ok(value)
}

fn report(
    output: OutputFormat,
    quiet: bool,
    key: LocalKey,
    state: &str,
    message: impl FnOnce() -> String,
) -> Result<()> {
    if output.is_text() {
        if quiet {
            println!("{}", key);
        } else {
            println!("{}", message());
        }
    } else {
        output.print_value(&serde_json::json!({ "key": key, "state": state }))?;
    }
    Ok(())
}

fn outcome(output: OutputFormat, quiet: bool, key: LocalKey, result: SyncOutcome) -> Result<()> {
    let (status, id) = match &result {
        SyncOutcome::Created(id) => ("created", Some(id.to_string())),
        SyncOutcome::Updated => ("updated", None),
        SyncOutcome::Unchanged => ("unchanged", None),
        SyncOutcome::Deleted => ("deleted", None),
        SyncOutcome::Discarded => ("discarded", None),
    };

    if output.is_text() {
        match (&id, quiet) {
            (Some(id), true) => println!("{}", id),
            (Some(id), false) => println!("Record {} {} with id {}", key, status, id),
            (None, false) => println!("Record {} {}", key, status),
            (None, true) => {}
        }
    } else {
        output.print_value(&serde_json::json!({ "key": key, "status": status, "id": id }))?;
    }
    Ok(())
}

fn print_list<E: Resource>(list: &DraftList<E>, output: OutputFormat) -> Result<()> {
    if !output.is_text() {
        let records: Vec<&DraftRecord<E>> = list.iter().collect();
        return output.print_value(&records);
    }

    if list.is_empty() {
        println!("No {}s in the workspace (try `pull`)", E::KIND);
        return Ok(());
    }

    print_table_header(&[("KEY", 5), ("STATE", 6), ("ID", 24), ("LABEL", 50)]);
    for record in list.iter() {
        let id = record
            .remote_id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        print_table_row(&[
            (&record.key().to_string(), 5),
            (record.state().label(), 6),
            (&id, 24),
            (&record.value().label(), 50),
        ]);
    }
    println!();
    println!(
        "{} record(s), {} persisted, {} with unpushed edits",
        list.len(),
        list.persisted_count(),
        list.dirty_count()
    );
    Ok(())
}

fn print_record<E: Resource>(record: &DraftRecord<E>, output: OutputFormat) -> Result<()> {
    if !output.is_text() {
        return output.print_value(record);
    }

    print_field("Key", &record.key().to_string());
    print_field("State", record.state().label());
    if let Some(id) = record.remote_id() {
        print_field("ID", id.as_str());
    }
    if let Value::Object(fields) = serde_json::to_value(record.value())? {
        for (name, value) in fields {
            let text = match value {
                _ if name == "password" => "********".to_string(),
                Value::String(s) => s,
                Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            print_field(&name, &text);
        }
    }
    if !record.errors().is_empty() {
        println!("Errors:");
        print_errors(record.errors());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use miseventos_core::Speaker;

    fn assignment(field: &str, value: &str) -> (String, String) {
        (field.to_string(), value.to_string())
    }

    #[test]
    fn test_build_draft_applies_all_fields() {
        let speaker: Speaker = build_draft(&[
            assignment("full_name", "Ana Torres"),
            assignment("email", "ana@example.com"),
        ])
        .unwrap();
        assert_eq!(speaker.full_name, "Ana Torres");
        assert_eq!(speaker.email, "ana@example.com");
    }

    #[test]
    fn test_failed_add_leaves_no_draft() {
        let mut list: DraftList<Speaker> = DraftList::new();
        let result = build_draft::<Speaker>(&[
            assignment("full_name", "Ana Torres"),
            assignment("nickname", "ana"),
        ])
        .map(|value| list.add(value));

        assert!(result.is_err());
        assert!(list.is_empty());
    }
}
