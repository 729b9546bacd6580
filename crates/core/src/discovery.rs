// Attendee-facing event listing (`GET /event/?page=&limit=`)

use serde::{Deserialize, Serialize};

use crate::speaker::SpeakerRecord;
use crate::wire::{format_time, parse_time};

/// One page of published events with their sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryPage {
    #[serde(default)]
    pub total: u32,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub events: Vec<EventItem>,
}

fn first_page() -> u32 {
    1
}

impl DiscoveryPage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn sessions(&self) -> impl Iterator<Item = (&EventSummary, &SessionItem)> {
        self.events
            .iter()
            .flat_map(|item| item.sessions.iter().map(move |s| (&item.event, s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventItem {
    pub event: EventSummary,
    #[serde(default)]
    pub sessions: Vec<SessionItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub capacity: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub registrations_count: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionItem {
    pub session: SessionDetail,
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub speakers: Vec<SpeakerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub event_id: String,
    pub capacity: u32,
    #[serde(default)]
    pub registrations_count: u32,
    #[serde(default)]
    pub user_registration_id: Option<String>,
    pub time_slot_id: String,
}

impl SessionDetail {
    /// Whether the last fetch reported the session as full
    pub fn is_full(&self) -> bool {
        self.registrations_count >= self.capacity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub event_id: String,
    #[serde(default)]
    pub is_assigned: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl TimeSlot {
    /// `HH:MM - HH:MM`, falling back to `00:00` for unreadable times
    pub fn display(&self) -> String {
        let show = |value: &str| {
            parse_time(value)
                .map(|t| format_time(&t))
                .unwrap_or_else(|| "00:00".to_string())
        };
        format!("{} - {}", show(&self.start_time), show(&self.end_time))
    }
}
