// Attendee commands: event discovery and session registration

use anyhow::Result;

use miseventos_client::Client;
use miseventos_core::{DiscoveryPage, Registration, RegistrationTracker};

use super::sync_error;
use crate::output::OutputFormat;

pub async fn discover(
    client: &Client,
    tracker: &mut RegistrationTracker,
    page: u32,
    limit: u32,
    output: OutputFormat,
) -> Result<()> {
    let result = client.discover(page, limit).await.map_err(sync_error)?;
    tracker.seed_from_discovery(&result);

    if output.is_text() {
        print_page(&result, tracker);
    } else {
        output.print_value(&result)?;
    }
    Ok(())
}

fn print_page(page: &DiscoveryPage, tracker: &RegistrationTracker) {
    if page.events.is_empty() {
        println!("No events found");
        return;
    }

    for item in &page.events {
        let event = &item.event;
        println!("{}  [{}]", event.title, event.id);
        println!("  {} → {}  capacity {}", event.start_date, event.end_date, event.capacity);
        if item.sessions.is_empty() {
            println!("  (no sessions yet)");
        }
        for session_item in &item.sessions {
            let session = &session_item.session;
            let marker = match tracker.registration(&session.id) {
                Some(Registration::Confirmed(_)) => "registered",
                Some(Registration::Pending) => "pending",
                None if !tracker.can_attend(&session.id) => "full",
                None => "open",
            };
            let speakers = session_item
                .speakers
                .iter()
                .map(|s| s.full_name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "  - {}  {}  [{}]  {}/{}  {}",
                session_item.time_slot.display(),
                session.title,
                session.id,
                session.registrations_count,
                session.capacity,
                marker
            );
            if !speakers.is_empty() {
                println!("      {}", speakers);
            }
        }
        println!();
    }
    println!("Page {} of {} ({} events)", page.page, page.total_pages, page.total);
}

pub async fn attend(
    client: &Client,
    tracker: &mut RegistrationTracker,
    event_id: &str,
    session_id: &str,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let registration_id = tracker
        .attend(event_id, session_id, client)
        .await
        .map_err(sync_error)?;
    if output.is_text() {
        if quiet {
            println!("{}", registration_id);
        } else {
            println!("Registered for session {} ({})", session_id, registration_id);
        }
    } else {
        output.print_value(&serde_json::json!({
            "session_id": session_id,
            "registration_id": registration_id,
        }))?;
    }
    Ok(())
}

pub async fn leave(
    client: &Client,
    tracker: &mut RegistrationTracker,
    session_id: &str,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    tracker.leave(session_id, client).await.map_err(sync_error)?;
    if output.is_text() {
        if !quiet {
            println!("Registration for session {} cancelled", session_id);
        }
    } else {
        output.print_value(&serde_json::json!({ "session_id": session_id, "status": "cancelled" }))?;
    }
    Ok(())
}
