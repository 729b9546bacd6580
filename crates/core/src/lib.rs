// Draft/Sync Core
//
// This crate provides a backend-agnostic implementation of the draft/sync
// lifecycle used by the admin tooling (create locally → edit → push).
//
// Key design decisions:
// - One generic container (DraftList) instead of per-entity copies of the lifecycle
// - Record state is an explicit enum (SyncState), so "dirty draft" cannot exist
// - Uses traits (RemoteStore, SlotStore, RegistrationStore) for pluggable backends
// - Validation runs before any store call; failures never reach the network
// - Store failures leave local state unchanged; only registration is optimistic
// - Entity types carry their own wire payloads and field validation

pub mod entity;
pub mod error;
pub mod state;
pub mod traits;
pub mod validation;

// Lifecycle containers
pub mod draft;
pub mod registration;

// Domain entity types
pub mod assignment;
pub mod discovery;
pub mod event;
pub mod schedule;
pub mod session;
pub mod speaker;
pub mod user;

mod wire;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use draft::{DraftList, DraftRecord};
pub use entity::Entity;
pub use error::{Result, SyncError};
pub use registration::{Registration, RegistrationRequest, RegistrationTracker, SessionCapacity};
pub use state::{Confirmation, LocalKey, RemoteId, SyncOutcome, SyncState};
pub use traits::{RegistrationStore, RemoteStore, SlotStore};
pub use validation::{FieldErrors, ValidationContext};

// Domain entity re-exports
pub use assignment::{validate_assignments, Assignment};
pub use discovery::{DiscoveryPage, EventItem, EventSummary, SessionDetail, SessionItem, TimeSlot};
pub use event::{Event, EventPayload, EventRecord, EventStatus};
pub use schedule::{Schedule, SchedulePayload, ScheduleRecord, SlotPayload, SlotRecord, TimeRange};
pub use session::{Session, SessionPayload, SessionRecord};
pub use speaker::{Speaker, SpeakerPayload, SpeakerRecord};
pub use user::{Role, User, UserPayload, UserRecord};
