// Authentication and account signup
//
// The backend authenticates by session cookie: login sets it, every later
// request carries it through the client's cookie jar.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use miseventos_core::user::validate_email;
use miseventos_core::{
    Entity, RemoteId, RemoteStore, Result, Role, SyncError, User, ValidationContext,
};

use crate::client::Client;
use crate::error::ClientError;

const LOGIN_FAILED: &str = "Fallo en la autenticación";

/// The signed-in user as reported by `GET /auth/me/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    #[serde(default)]
    user: Option<AuthUser>,
}

impl Client {
    /// Sign in and return the current user
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser> {
        validate_email(email)?;

        let body = json!({ "email": email.trim(), "password": password });
        let result: std::result::Result<Value, ClientError> = self.post("/login/", &body).await;
        match result {
            Ok(_) => {}
            Err(ClientError::Api { message, .. }) | Err(ClientError::Rejected(message)) => {
                let message = if message.trim().is_empty() {
                    LOGIN_FAILED.to_string()
                } else {
                    message
                };
                tracing::warn!(email = %email.trim(), %message, "Login failed");
                return Err(SyncError::Rejected(message));
            }
            Err(ClientError::NotFound) => return Err(SyncError::rejected(LOGIN_FAILED)),
            Err(e) => return Err(e.into()),
        }

        let user = self
            .me()
            .await?
            .ok_or_else(|| SyncError::rejected(LOGIN_FAILED))?;
        tracing::info!(email = %user.email, role = %user.role, "Logged in");
        Ok(user)
    }

    /// Current user, or `None` when no valid session exists
    pub async fn me(&self) -> Result<Option<AuthUser>> {
        match self.get::<MeResponse>("/auth/me/").await {
            Ok(response) => Ok(response.user),
            Err(ClientError::Rejected(_)) | Err(ClientError::NotFound) => Ok(None),
            Err(ClientError::Api { status: 401 | 403, .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn logout(&self) -> Result<()> {
        let _: Value = self.post("/logout/", &json!({})).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Create an attendee account
    pub async fn signup(&self, email: &str, password: &str) -> Result<Option<RemoteId>> {
        let user = User::assistant(email.trim(), password);
        let errors = user.validate(&ValidationContext::now());
        if !errors.is_empty() {
            return Err(SyncError::Validation(errors));
        }

        let confirmation = RemoteStore::<User>::create(self, &user).await?;
        tracing::info!(email = %user.email, "Account created");
        Ok(confirmation.id)
    }
}
