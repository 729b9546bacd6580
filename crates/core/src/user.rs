// User accounts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entity::Entity;
use crate::error::{Result, SyncError};
use crate::state::RemoteId;
use crate::validation::{char_len, is_valid_email, FieldErrors, ValidationContext};

pub const PASSWORD_MIN_CHARS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "assistant" => Ok(Role::Assistant),
            _ => Err(SyncError::invalid_value("role", "Rol inválido")),
        }
    }
}

/// Editable user account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// User as listed by `GET /user/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Body of `POST /user/register` and `PUT /user/`
#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl User {
    /// Self-service signup account
    pub fn assistant(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: Role::Assistant,
        }
    }
}

/// Email check used by login and signup
pub fn validate_email(email: &str) -> Result<()> {
    if is_valid_email(email.trim()) {
        Ok(())
    } else {
        let mut errors = FieldErrors::new();
        errors.insert(
            "email",
            "Por favor, ingresa un correo electrónico válido.",
        );
        Err(SyncError::Validation(errors))
    }
}

impl Entity for User {
    const KIND: &'static str = "user";

    type Record = UserRecord;
    type Payload = UserPayload;

    fn from_record(record: UserRecord) -> (RemoteId, Self) {
        (
            RemoteId::new(record.id),
            User {
                email: record.email,
                password: record.password.unwrap_or_default(),
                role: record.role,
            },
        )
    }

    fn payload(&self, id: Option<&RemoteId>) -> UserPayload {
        UserPayload {
            id: id.map(|id| id.to_string()),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
        }
    }

    fn validate(&self, _ctx: &ValidationContext) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !is_valid_email(self.email.trim()) {
            errors.insert(
                "email",
                "Por favor, ingresa un correo electrónico válido.",
            );
        }
        if char_len(&self.password) < PASSWORD_MIN_CHARS {
            errors.insert(
                "password",
                "La contraseña debe tener al menos 8 caracteres.",
            );
        }

        errors
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            "role" => self.role = value.parse()?,
            _ => return Err(SyncError::unknown_field(Self::KIND, field)),
        }
        Ok(())
    }

    fn label(&self) -> String {
        format!("{} ({})", self.email, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_rules() {
        let ctx = ValidationContext::default();
        assert!(User::assistant("ana@example.com", "12345678")
            .validate(&ctx)
            .is_empty());

        let errors = User::assistant("ana@", "1234567").validate(&ctx);
        assert_eq!(
            errors.get("email"),
            Some("Por favor, ingresa un correo electrónico válido.")
        );
        assert_eq!(
            errors.get("password"),
            Some("La contraseña debe tener al menos 8 caracteres.")
        );
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("moderator".parse::<Role>().is_err());

        let mut user = User::default();
        assert!(matches!(
            user.set_field("role", "root"),
            Err(SyncError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_payload_role_lowercase() {
        let payload = serde_json::to_value(User::assistant("a@b.co", "secret-pass").payload(None)).unwrap();
        assert_eq!(payload["role"], "assistant");
        assert!(payload.get("id").is_none());
    }

    #[test]
    fn test_validate_email_helper() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(matches!(
            validate_email("ana"),
            Err(SyncError::Validation(_))
        ));
    }
}
