// Session entity

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{Result, SyncError};
use crate::state::RemoteId;
use crate::validation::{char_len, is_blank, FieldErrors, ValidationContext};

pub const MAX_SESSION_CAPACITY: i64 = 1000;
const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 500;

/// Editable session
///
/// References to the event, time slot and speaker are plain ids chosen from
/// lists; nothing here checks that they exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub event_id: String,
    pub time_slot_id: String,
    #[serde(default)]
    pub speaker_id: String,
    pub title: String,
    pub capacity: String,
    #[serde(default)]
    pub description: String,
}

/// Session as listed by `GET /session/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_id: String,
    pub capacity: u32,
    pub time_slot_id: String,
    #[serde(default)]
    pub speaker_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /session/` and `PUT /session/`
#[derive(Debug, Clone, Serialize)]
pub struct SessionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub event_id: String,
    pub time_slot_id: String,
    pub title: String,
    pub capacity: u32,
    pub description: Option<String>,
    pub speaker_id: Option<String>,
}

impl Session {
    fn capacity_value(&self) -> Option<i64> {
        self.capacity.trim().parse().ok()
    }
}

impl Entity for Session {
    const KIND: &'static str = "session";

    type Record = SessionRecord;
    type Payload = SessionPayload;

    fn from_record(record: SessionRecord) -> (RemoteId, Self) {
        (
            RemoteId::new(record.id),
            Session {
                event_id: record.event_id,
                time_slot_id: record.time_slot_id,
                speaker_id: record.speaker_id.unwrap_or_default(),
                title: record.title,
                capacity: record.capacity.to_string(),
                description: record.description.unwrap_or_default(),
            },
        )
    }

    fn payload(&self, id: Option<&RemoteId>) -> SessionPayload {
        let description = self.description.trim().to_string();
        // Updates send null for an empty description, creates send the empty string
        let description = match id {
            Some(_) if description.is_empty() => None,
            _ => Some(description),
        };
        let speaker_id = Some(self.speaker_id.trim().to_string()).filter(|s| !s.is_empty());

        SessionPayload {
            id: id.map(|id| id.to_string()),
            event_id: self.event_id.clone(),
            time_slot_id: self.time_slot_id.clone(),
            title: self.title.trim().to_string(),
            capacity: self
                .capacity_value()
                .and_then(|c| u32::try_from(c).ok())
                .unwrap_or(0),
            description,
            speaker_id,
        }
    }

    fn validate(&self, _ctx: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.event_id) {
            errors.insert("event_id", "Seleccione un evento");
        }
        if is_blank(&self.time_slot_id) {
            errors.insert("time_slot_id", "Seleccione un horario");
        }

        let title_len = char_len(self.title.trim());
        if title_len == 0 {
            errors.insert("title", "El título es requerido");
        } else if title_len < TITLE_MIN_CHARS {
            errors.insert("title", "El título debe tener al menos 3 caracteres");
        } else if title_len > TITLE_MAX_CHARS {
            errors.insert("title", "El título no puede exceder 100 caracteres");
        }

        if is_blank(&self.capacity) {
            errors.insert("capacity", "La capacidad es requerida");
        } else {
            match self.capacity_value() {
                Some(c) if c > MAX_SESSION_CAPACITY => {
                    errors.insert("capacity", "La capacidad no puede exceder 1000 personas")
                }
                Some(c) if c > 0 => {}
                _ => errors.insert("capacity", "La capacidad debe ser mayor a 0"),
            }
        }

        if char_len(&self.description) > DESCRIPTION_MAX_CHARS {
            errors.insert(
                "description",
                "La descripción no puede exceder 500 caracteres",
            );
        }

        errors
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "event_id" => self.event_id = value.to_string(),
            "time_slot_id" => self.time_slot_id = value.to_string(),
            "speaker_id" => self.speaker_id = value.to_string(),
            "title" => self.title = value.to_string(),
            "capacity" => self.capacity = value.to_string(),
            "description" => self.description = value.to_string(),
            _ => return Err(SyncError::unknown_field(Self::KIND, field)),
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.title.clone()
    }
}
