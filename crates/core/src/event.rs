// Event entity

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entity::Entity;
use crate::error::{Result, SyncError};
use crate::state::RemoteId;
use crate::validation::{is_blank, FieldErrors, ValidationContext};
use crate::wire::{format_datetime, parse_datetime, set_datetime, string_or_number};

/// Publication status of an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Published,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Published => "published",
            EventStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "published" => Ok(EventStatus::Published),
            "closed" => Ok(EventStatus::Closed),
            other => Err(SyncError::invalid_value(
                "status",
                format!("unknown status '{}', expected published or closed", other),
            )),
        }
    }
}

/// Editable event
///
/// `capacity` stays textual so "missing" and "not positive" can be told apart.
/// `original_start_date` is the start date last confirmed by the backend; the
/// "not in the past" rule only applies when the start date moved away from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub capacity: String,
    pub status: EventStatus,
    #[serde(default)]
    pub original_start_date: Option<NaiveDateTime>,
}

/// Event as listed by `GET /event/all/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub capacity: String,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /event/` and `PUT /event/`
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub capacity: u32,
    pub status: EventStatus,
}

impl Event {
    fn capacity_value(&self) -> Option<i64> {
        self.capacity.trim().parse().ok()
    }
}

impl Entity for Event {
    const KIND: &'static str = "event";

    type Record = EventRecord;
    type Payload = EventPayload;

    fn from_record(record: EventRecord) -> (RemoteId, Self) {
        let start_date = parse_datetime(&record.start_date);
        (
            RemoteId::new(record.id),
            Event {
                title: record.title,
                description: record.description,
                start_date,
                end_date: parse_datetime(&record.end_date),
                capacity: record.capacity,
                status: record.status,
                original_start_date: start_date,
            },
        )
    }

    fn payload(&self, id: Option<&RemoteId>) -> EventPayload {
        EventPayload {
            id: id.map(|id| id.to_string()),
            title: self.title.clone(),
            description: self.description.clone(),
            start_date: self.start_date.as_ref().map(format_datetime).unwrap_or_default(),
            end_date: self.end_date.as_ref().map(format_datetime).unwrap_or_default(),
            capacity: self
                .capacity_value()
                .and_then(|c| u32::try_from(c).ok())
                .unwrap_or(0),
            status: self.status,
        }
    }

    fn validate(&self, ctx: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.title) {
            errors.insert("title", "Título requerido");
        }
        if is_blank(&self.description) {
            errors.insert("description", "Descripción requerida");
        }

        match self.start_date {
            None => errors.insert("start_date", "Fecha inicio requerida"),
            Some(start) => {
                // Deliberately looser than the web admin form, which rejects
                // every past start: an unchanged confirmed start passes, so
                // events that already began can still be edited
                let moved = self.original_start_date != Some(start);
                if moved && start < ctx.now {
                    errors.insert("start_date", "No puede ser en el pasado");
                }
            }
        }

        match (self.start_date, self.end_date) {
            (_, None) => errors.insert("end_date", "Fecha fin requerida"),
            (Some(start), Some(end)) if end <= start => {
                errors.insert("end_date", "Debe ser posterior a inicio")
            }
            _ => {}
        }

        if is_blank(&self.capacity) {
            errors.insert("capacity", "Capacidad requerida");
        } else if !self.capacity_value().is_some_and(|c| c > 0) {
            errors.insert("capacity", "Debe ser mayor a 0");
        }

        errors
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "start_date" => self.start_date = set_datetime(field, value)?,
            "end_date" => self.end_date = set_datetime(field, value)?,
            "capacity" => self.capacity = value.to_string(),
            "status" => self.status = value.parse()?,
            _ => return Err(SyncError::unknown_field(Self::KIND, field)),
        }
        Ok(())
    }

    fn label(&self) -> String {
        match self.start_date {
            Some(start) => format!("{} ({})", self.title, format_datetime(&start)),
            None => self.title.clone(),
        }
    }

    fn confirmed(&mut self, _part_ids: &[RemoteId]) {
        self.original_start_date = self.start_date;
    }
}
