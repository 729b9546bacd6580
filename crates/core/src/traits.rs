// Core traits for pluggable backends
//
// These traits allow the lifecycle to be used with different backends:
// - The HTTP client for production
// - In-memory implementations for examples and testing

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::Result;
use crate::registration::RegistrationRequest;
use crate::state::{Confirmation, RemoteId};

// ============================================================================
// RemoteStore - CRUD endpoints for one entity kind
// ============================================================================

/// Trait for the backend collection behind a DraftList
///
/// Implementations must report `success: false` answers as
/// `SyncError::Rejected` and transport/HTTP failures as `SyncError::Store`.
#[async_trait]
pub trait RemoteStore<E: Entity>: Send + Sync {
    /// Fetch every persisted record
    async fn list(&self) -> Result<Vec<(RemoteId, E)>>;

    /// Persist a new record; the confirmation carries whatever ids the
    /// backend reported
    async fn create(&self, value: &E) -> Result<Confirmation>;

    /// Push local edits of a persisted record
    async fn update(&self, id: &RemoteId, value: &E) -> Result<Confirmation>;

    /// Delete a persisted record
    async fn delete(&self, id: &RemoteId, value: &E) -> Result<()>;
}

// ============================================================================
// SlotStore - Individual time slots of a schedule
// ============================================================================

/// Trait for deleting single time slots
///
/// A slot the backend no longer knows counts as deleted.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn delete_slot(&self, slot_id: &RemoteId) -> Result<()>;
}

// ============================================================================
// RegistrationStore - Attendee session registrations
// ============================================================================

/// Trait for registering the current user to sessions
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Register; returns the registration id
    async fn register(&self, request: &RegistrationRequest) -> Result<String>;

    /// Cancel a registration by its id
    async fn unregister(&self, registration_id: &str) -> Result<()>;
}
