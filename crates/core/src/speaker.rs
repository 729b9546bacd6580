// Speaker entity

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{Result, SyncError};
use crate::state::RemoteId;
use crate::validation::{char_len, is_blank, is_valid_email, FieldErrors, ValidationContext};

pub const BIO_MIN_CHARS: usize = 10;
pub const BIO_MAX_CHARS: usize = 500;
const NAME_MIN_CHARS: usize = 2;

/// Editable speaker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub full_name: String,
    pub email: String,
    pub bio: String,
}

/// Speaker as listed by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakerRecord {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `POST /speaker/` and `PUT /speaker/`
#[derive(Debug, Clone, Serialize)]
pub struct SpeakerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub bio: String,
}

impl Entity for Speaker {
    const KIND: &'static str = "speaker";

    type Record = SpeakerRecord;
    type Payload = SpeakerPayload;

    fn from_record(record: SpeakerRecord) -> (RemoteId, Self) {
        (
            RemoteId::new(record.id),
            Speaker {
                full_name: record.full_name,
                email: record.email,
                bio: record.bio,
            },
        )
    }

    fn payload(&self, id: Option<&RemoteId>) -> SpeakerPayload {
        SpeakerPayload {
            id: id.map(|id| id.to_string()),
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            bio: self.bio.trim().to_string(),
        }
    }

    fn validate(&self, _ctx: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if is_blank(&self.full_name) {
            errors.insert("full_name", "El nombre completo es requerido");
        } else if char_len(self.full_name.trim()) < NAME_MIN_CHARS {
            errors.insert("full_name", "El nombre debe tener al menos 2 caracteres");
        }

        if is_blank(&self.email) {
            errors.insert("email", "El email es requerido");
        } else if !is_valid_email(self.email.trim()) {
            errors.insert("email", "Por favor ingrese un email válido");
        }

        let bio_len = char_len(self.bio.trim());
        if bio_len == 0 {
            errors.insert("bio", "La biografía es requerida");
        } else if bio_len < BIO_MIN_CHARS {
            errors.insert("bio", "La biografía debe tener al menos 10 caracteres");
        } else if bio_len > BIO_MAX_CHARS {
            errors.insert("bio", "La biografía no puede exceder los 500 caracteres");
        }

        errors
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "full_name" => self.full_name = value.to_string(),
            "email" => self.email = value.to_string(),
            "bio" => self.bio = value.to_string(),
            _ => return Err(SyncError::unknown_field(Self::KIND, field)),
        }
        Ok(())
    }

    fn label(&self) -> String {
        format!("{} <{}>", self.full_name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaker_with_bio(bio: &str) -> Speaker {
        Speaker {
            full_name: "Carlos Rodríguez".to_string(),
            email: "carlos@example.com".to_string(),
            bio: bio.to_string(),
        }
    }

    #[test]
    fn test_bio_bounds() {
        let ctx = ValidationContext::default();

        let nine = speaker_with_bio(&"a".repeat(9)).validate(&ctx);
        assert_eq!(
            nine.get("bio"),
            Some("La biografía debe tener al menos 10 caracteres")
        );

        assert!(speaker_with_bio(&"a".repeat(10)).validate(&ctx).is_empty());
        assert!(speaker_with_bio(&"a".repeat(500)).validate(&ctx).is_empty());

        let long = speaker_with_bio(&"a".repeat(501)).validate(&ctx);
        assert_eq!(
            long.get("bio"),
            Some("La biografía no puede exceder los 500 caracteres")
        );
    }

    #[test]
    fn test_bio_is_trimmed_before_counting() {
        let ctx = ValidationContext::default();
        let padded = speaker_with_bio(&format!("  {}  ", "a".repeat(9))).validate(&ctx);
        assert!(padded.contains("bio"));
    }

    #[test]
    fn test_required_fields() {
        let errors = Speaker::default().validate(&ValidationContext::default());
        assert_eq!(errors.get("full_name"), Some("El nombre completo es requerido"));
        assert_eq!(errors.get("email"), Some("El email es requerido"));
        assert_eq!(errors.get("bio"), Some("La biografía es requerida"));
    }

    #[test]
    fn test_short_name_and_bad_email() {
        let speaker = Speaker {
            full_name: " A ".to_string(),
            email: "not-an-email".to_string(),
            bio: "Speaks about distributed systems".to_string(),
        };
        let errors = speaker.validate(&ValidationContext::default());
        assert_eq!(
            errors.get("full_name"),
            Some("El nombre debe tener al menos 2 caracteres")
        );
        assert_eq!(errors.get("email"), Some("Por favor ingrese un email válido"));
    }

    #[test]
    fn test_payload_trims_and_carries_id() {
        let speaker = Speaker {
            full_name: " Ana ".to_string(),
            email: " ana@example.com ".to_string(),
            bio: " Long enough biography ".to_string(),
        };
        let create = serde_json::to_value(speaker.payload(None)).unwrap();
        assert_eq!(
            create,
            serde_json::json!({
                "full_name": "Ana",
                "email": "ana@example.com",
                "bio": "Long enough biography"
            })
        );

        let update = serde_json::to_value(speaker.payload(Some(&RemoteId::new("sp-9")))).unwrap();
        assert_eq!(update["id"], "sp-9");
    }
}
