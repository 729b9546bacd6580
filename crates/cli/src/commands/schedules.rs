// Schedule commands: the shared draft commands plus time-range editing

use anyhow::Result;
use clap::Subcommand;

use miseventos_client::Client;
use miseventos_core::{DraftList, Entity, LocalKey, Schedule, TimeRange};

use super::drafts::{self, DraftCommand};
use super::sync_error;
use crate::output::OutputFormat;

#[derive(Subcommand, Debug)]
pub enum SchedulesCommand {
    #[command(flatten)]
    Draft(DraftCommand),

    /// Append a time range (HH:MM)
    AddRange {
        key: LocalKey,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,
    },

    /// Remove a time range; saved slots are deleted in the backend first
    RemoveRange {
        key: LocalKey,

        /// Zero-based range index, as shown by `show`
        index: usize,
    },
}

pub async fn run(
    command: SchedulesCommand,
    list: &mut DraftList<Schedule>,
    client: &Client,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        SchedulesCommand::Draft(command) => drafts::run(command, list, client, output, quiet).await,
        SchedulesCommand::AddRange { key, start, end } => {
            let index = list
                .edit(key, |schedule| {
                    let mut next = schedule.clone();
                    next.time_ranges.push(TimeRange::default());
                    let index = next.time_ranges.len() - 1;
                    next.set_field(&format!("ranges.{}.start_time", index), &start)?;
                    next.set_field(&format!("ranges.{}.end_time", index), &end)?;
                    *schedule = next;
                    Ok(index)
                })
                .map_err(sync_error)?;
            print_ranges(list, key, output, quiet, &format!("Added range {}", index))
        }
        SchedulesCommand::RemoveRange { key, index } => {
            list.remove_slot(key, index, client)
                .await
                .map_err(sync_error)?;
            print_ranges(list, key, output, quiet, &format!("Removed range {}", index))
        }
    }
}

fn print_ranges(
    list: &DraftList<Schedule>,
    key: LocalKey,
    output: OutputFormat,
    quiet: bool,
    message: &str,
) -> Result<()> {
    let Some(record) = list.get(key) else {
        return Ok(());
    };
    let ranges = &record.value().time_ranges;

    if !output.is_text() {
        return output.print_value(ranges);
    }
    if quiet {
        return Ok(());
    }
    println!("{}", message);
    for (i, range) in ranges.iter().enumerate() {
        let saved = if range.slot_id.is_some() { "" } else { " (unsaved)" };
        println!("  [{}] {}  {}{}", i, range.display(), range.duration(), saved);
    }
    Ok(())
}
