// The Entity trait: what DraftList needs to know about a record type

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::error::Result;
use crate::state::RemoteId;
use crate::validation::{FieldErrors, ValidationContext};

/// An editable record kind that can be synced with the backend
///
/// Implementors are the editable view-model (what the user types), not the
/// backend's source of truth. `Record` is the shape the backend lists,
/// `Payload` the JSON body sent on create/update.
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Human-readable kind used in messages and logs
    const KIND: &'static str;

    /// Record as returned by the backend's list endpoint
    type Record: DeserializeOwned + Send;

    /// JSON body for create (`id == None`) and update (`id == Some`)
    type Payload: Serialize + Send + Sync;

    /// Map a backend record into its id and editable form
    fn from_record(record: Self::Record) -> (RemoteId, Self);

    /// Build the wire payload
    fn payload(&self, id: Option<&RemoteId>) -> Self::Payload;

    /// Validate all fields; an empty map means the record may be sent
    fn validate(&self, ctx: &ValidationContext) -> FieldErrors;

    /// Set one field from its textual form
    fn set_field(&mut self, field: &str, value: &str) -> Result<()>;

    /// Short description for listings
    fn label(&self) -> String;

    /// Id to assume when a create response does not carry one
    fn fallback_id(&self) -> Option<RemoteId> {
        None
    }

    /// Hook run after the backend accepted the current values
    ///
    /// `part_ids` are the nested ids listed in the backend's answer, if any.
    fn confirmed(&mut self, _part_ids: &[RemoteId]) {}

    /// Refuse a remote delete the backend could not fully carry out
    fn check_deletable(&self) -> Result<()> {
        Ok(())
    }
}
