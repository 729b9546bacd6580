// RegistrationTracker - attendee registrations with optimistic updates
//
// The tracker reflects intent immediately (a pending entry on attend, removal
// on leave), calls the backend, and on any failure restores the exact
// pre-attempt snapshot of the map. Capacity figures come from the last
// discovery fetch and are trusted as-is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::discovery::DiscoveryPage;
use crate::error::{Result, SyncError};
use crate::traits::RegistrationStore;

/// Body of `POST /register-session/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub event_id: String,
    pub session_id: String,
}

/// Registration state of one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "id", rename_all = "snake_case")]
pub enum Registration {
    /// Request sent, no answer yet
    Pending,
    /// Backend confirmed with this registration id
    Confirmed(String),
}

impl Registration {
    pub fn id(&self) -> Option<&str> {
        match self {
            Registration::Pending => None,
            Registration::Confirmed(id) => Some(id),
        }
    }
}

/// Capacity figures as of the last fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapacity {
    pub capacity: u32,
    pub registrations_count: u32,
}

impl SessionCapacity {
    pub fn is_full(&self) -> bool {
        self.registrations_count >= self.capacity
    }
}

/// Map of session id → registration, plus known capacities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationTracker {
    #[serde(default)]
    registered: BTreeMap<String, Registration>,
    #[serde(default)]
    capacity: BTreeMap<String, SessionCapacity>,
}

impl RegistrationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record capacities and registrations reported by a discovery page
    ///
    /// The page is authoritative for the sessions it lists: a listed session
    /// without a registration id drops any registration held locally.
    pub fn seed_from_discovery(&mut self, page: &DiscoveryPage) {
        for (_, item) in page.sessions() {
            let session = &item.session;
            self.capacity.insert(
                session.id.clone(),
                SessionCapacity {
                    capacity: session.capacity,
                    registrations_count: session.registrations_count,
                },
            );
            match &session.user_registration_id {
                Some(registration_id) => {
                    self.registered.insert(
                        session.id.clone(),
                        Registration::Confirmed(registration_id.clone()),
                    );
                }
                None => {
                    if self.registered.remove(&session.id).is_some() {
                        tracing::debug!(session_id = %session.id, "Registration gone from backend");
                    }
                }
            }
        }
    }

    pub fn is_registered(&self, session_id: &str) -> bool {
        self.registered.contains_key(session_id)
    }

    pub fn registration(&self, session_id: &str) -> Option<&Registration> {
        self.registered.get(session_id)
    }

    pub fn registrations(&self) -> impl Iterator<Item = (&str, &Registration)> {
        self.registered.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn capacity(&self, session_id: &str) -> Option<SessionCapacity> {
        self.capacity.get(session_id).copied()
    }

    /// False once the last fetch showed the session full; unknown sessions are allowed
    pub fn can_attend(&self, session_id: &str) -> bool {
        self.capacity
            .get(session_id)
            .map(|c| !c.is_full())
            .unwrap_or(true)
    }

    /// Register for a session
    ///
    /// Already-confirmed registrations are returned without a network call.
    pub async fn attend<S>(&mut self, event_id: &str, session_id: &str, store: &S) -> Result<String>
    where
        S: RegistrationStore + ?Sized,
    {
        if let Some(Registration::Confirmed(id)) = self.registered.get(session_id) {
            return Ok(id.clone());
        }
        if !self.can_attend(session_id) {
            return Err(SyncError::SessionFull(session_id.to_string()));
        }

        let snapshot = self.registered.clone();
        self.registered
            .insert(session_id.to_string(), Registration::Pending);

        let request = RegistrationRequest {
            event_id: event_id.to_string(),
            session_id: session_id.to_string(),
        };
        match store.register(&request).await {
            Ok(registration_id) => {
                self.registered.insert(
                    session_id.to_string(),
                    Registration::Confirmed(registration_id.clone()),
                );
                if let Some(c) = self.capacity.get_mut(session_id) {
                    c.registrations_count += 1;
                }
                tracing::info!(
                    session_id,
                    registration_id = %registration_id,
                    "Registered for session"
                );
                Ok(registration_id)
            }
            Err(e) => {
                self.registered = snapshot;
                tracing::warn!(session_id, error = %e, "Registration failed; restored previous state");
                Err(e)
            }
        }
    }

    /// Cancel the registration for a session
    pub async fn leave<S>(&mut self, session_id: &str, store: &S) -> Result<()>
    where
        S: RegistrationStore + ?Sized,
    {
        let registration_id = match self.registered.get(session_id) {
            Some(Registration::Confirmed(id)) => id.clone(),
            _ => return Err(SyncError::NotRegistered(session_id.to_string())),
        };

        let snapshot = self.registered.clone();
        self.registered.remove(session_id);

        match store.unregister(&registration_id).await {
            Ok(()) => {
                if let Some(c) = self.capacity.get_mut(session_id) {
                    c.registrations_count = c.registrations_count.saturating_sub(1);
                }
                tracing::info!(session_id, registration_id = %registration_id, "Registration cancelled");
                Ok(())
            }
            Err(e) => {
                self.registered = snapshot;
                tracing::warn!(session_id, error = %e, "Cancellation failed; restored previous state");
                Err(e)
            }
        }
    }
}
