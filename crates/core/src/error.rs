// Error types for the draft/sync lifecycle

use thiserror::Error;

use crate::state::{LocalKey, RemoteId};
use crate::validation::FieldErrors;

/// Result type alias for draft/sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while editing or syncing records
#[derive(Debug, Error)]
pub enum SyncError {
    /// Client-side validation failed; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Update requested for a record the backend has never seen
    #[error("This {kind} does not exist in the backend yet; create it first")]
    NotPersisted { kind: &'static str },

    /// Create requested for a record that is already persisted
    #[error("This {kind} already exists in the backend; update it instead")]
    AlreadyPersisted { kind: &'static str },

    /// No local record with this key
    #[error("No local record with key {0}")]
    UnknownRecord(LocalKey),

    /// Field name not known to the entity
    #[error("Unknown field for {kind}: {field}")]
    UnknownField { kind: &'static str, field: String },

    /// Field value could not be parsed or applied
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// The record only holds a client-generated id
    #[error("Record {0} only has a placeholder id; reload from the backend before changing it")]
    PlaceholderId(RemoteId),

    /// Saved parts of the record have no known backend id
    #[error("This {kind} holds saved parts with unknown ids; reload from the backend first")]
    UnknownPartIds { kind: &'static str },

    /// Session capacity reached according to the last fetch
    #[error("Session {0} is full")]
    SessionFull(String),

    /// No confirmed registration for this session
    #[error("Not registered for session {0}")]
    NotRegistered(String),

    /// Transport or HTTP failure talking to the backend
    #[error("Backend error: {0}")]
    Store(String),

    /// The backend answered but reported `success: false`
    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SyncError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        SyncError::Store(msg.into())
    }

    /// Create a rejected error
    pub fn rejected(msg: impl Into<String>) -> Self {
        SyncError::Rejected(msg.into())
    }

    /// Create an unknown field error
    pub fn unknown_field(kind: &'static str, field: impl Into<String>) -> Self {
        SyncError::UnknownField {
            kind,
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from the backend (as opposed to local checks)
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Store(_) | SyncError::Rejected(_))
    }
}
