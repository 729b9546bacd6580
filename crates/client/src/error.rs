// Client errors

use miseventos_core::SyncError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found")]
    NotFound,

    /// 2xx response whose envelope reported `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ClientError> for SyncError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(message) => SyncError::Rejected(message),
            other => SyncError::Store(other.to_string()),
        }
    }
}
