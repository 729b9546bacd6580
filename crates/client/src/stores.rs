// Backend collections behind the core store traits
//
// Every entity kind maps to one REST resource. The differences between them
// (list path, envelope key, where the created id sits) are described by the
// `Resource` trait; the request flow itself is shared.

use async_trait::async_trait;
use serde_json::Value;

use miseventos_core::{
    Confirmation, Entity, Event, RegistrationRequest, RegistrationStore, RemoteId, RemoteStore,
    Result, Schedule, Session, SlotStore, Speaker, SyncError, User,
};

use crate::client::{find_id, Client};
use crate::error::ClientError;

/// REST resource layout for one entity kind
pub trait Resource: Entity {
    /// Collection path for POST/PUT and `{PATH}{id}` deletes
    const PATH: &'static str;
    const LIST_PATH: &'static str;
    /// Envelope key holding the listed records
    const LIST_KEY: &'static str;
    const CREATE_PATH: &'static str = Self::PATH;
    /// JSON pointers tried, in order, to find the id of a created record
    const ID_POINTERS: &'static [&'static str];

    /// Whether a listed record belongs in the collection
    fn keep(_record: &Self::Record) -> bool {
        true
    }

    /// Paths to DELETE to remove a persisted record
    fn delete_paths(id: &RemoteId, _value: &Self) -> Vec<String> {
        vec![format!("{}{}", Self::PATH, id)]
    }

    /// Whether the record is deleted part by part; a 404 on one part then
    /// means an earlier attempt already removed it
    const DELETE_IN_PARTS: bool = false;

    /// Nested part ids listed in a create/update response
    fn part_ids(_body: &Value) -> Vec<RemoteId> {
        Vec::new()
    }

    fn confirmation(body: &Value) -> Confirmation {
        Confirmation {
            id: find_id(body, Self::ID_POINTERS),
            part_ids: Self::part_ids(body),
        }
    }
}

impl Resource for Event {
    const PATH: &'static str = "/event/";
    const LIST_PATH: &'static str = "/event/all/?page=1&limit=10";
    const LIST_KEY: &'static str = "events";
    const ID_POINTERS: &'static [&'static str] = &["/id", "/event/id", "/events/id"];
}

impl Resource for Speaker {
    const PATH: &'static str = "/speaker/";
    const LIST_PATH: &'static str = "/speaker/";
    const LIST_KEY: &'static str = "speaker";
    const ID_POINTERS: &'static [&'static str] = &["/speaker/id", "/id"];
}

impl Resource for Session {
    const PATH: &'static str = "/session/";
    const LIST_PATH: &'static str = "/session/";
    const LIST_KEY: &'static str = "session";
    const ID_POINTERS: &'static [&'static str] = &["/session/id", "/id"];
}

impl Resource for Schedule {
    const PATH: &'static str = "/slot/";
    const LIST_PATH: &'static str = "/event/slot/";
    const LIST_KEY: &'static str = "events";
    const ID_POINTERS: &'static [&'static str] = &["/id", "/slot/id"];
    const DELETE_IN_PARTS: bool = true;

    fn keep(record: &Self::Record) -> bool {
        record.has_slots()
    }

    /// `time_slots` on create, `slot.slots` on update; all or nothing
    fn part_ids(body: &Value) -> Vec<RemoteId> {
        ["/time_slots", "/slot/slots"]
            .iter()
            .filter_map(|pointer| body.pointer(pointer).and_then(Value::as_array))
            .find(|slots| !slots.is_empty())
            .and_then(|slots| {
                slots
                    .iter()
                    .map(|slot| find_id(slot, &["/id"]))
                    .collect::<Option<Vec<_>>>()
            })
            .unwrap_or_default()
    }

    /// A schedule is removed slot by slot
    fn delete_paths(_id: &RemoteId, value: &Self) -> Vec<String> {
        value
            .time_ranges
            .iter()
            .filter_map(|range| range.slot_id.as_ref())
            .map(|slot_id| format!("{}{}", Self::PATH, slot_id))
            .collect()
    }
}

impl Resource for User {
    const PATH: &'static str = "/user/";
    const LIST_PATH: &'static str = "/user/";
    const LIST_KEY: &'static str = "users";
    const CREATE_PATH: &'static str = "/user/register";
    const ID_POINTERS: &'static [&'static str] = &["/id", "/user/id", "/users/id"];
}

#[async_trait]
impl<E: Resource> RemoteStore<E> for Client {
    async fn list(&self) -> Result<Vec<(RemoteId, E)>> {
        let mut body: Value = self.get(E::LIST_PATH).await?;
        let records = match body.get_mut(E::LIST_KEY).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value::<Vec<E::Record>>(value)
                .map_err(|e| SyncError::store(format!("Unexpected {} list: {}", E::KIND, e)))?,
        };

        Ok(records
            .into_iter()
            .filter(E::keep)
            .map(E::from_record)
            .collect())
    }

    async fn create(&self, value: &E) -> Result<Confirmation> {
        let body: Value = self.post(E::CREATE_PATH, &value.payload(None)).await?;
        Ok(E::confirmation(&body))
    }

    async fn update(&self, id: &RemoteId, value: &E) -> Result<Confirmation> {
        let body: Value = self.put(E::PATH, &value.payload(Some(id))).await?;
        Ok(E::confirmation(&body))
    }

    async fn delete(&self, id: &RemoteId, value: &E) -> Result<()> {
        for path in E::delete_paths(id, value) {
            match Client::delete(self, &path).await {
                Err(ClientError::NotFound) if E::DELETE_IN_PARTS => {
                    tracing::debug!(%path, "Part already gone");
                }
                other => other?,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SlotStore for Client {
    async fn delete_slot(&self, slot_id: &RemoteId) -> Result<()> {
        match Client::delete(self, &format!("{}{}", Schedule::PATH, slot_id)).await {
            Err(ClientError::NotFound) => {
                tracing::debug!(%slot_id, "Slot already gone");
                Ok(())
            }
            other => Ok(other?),
        }
    }
}

#[async_trait]
impl RegistrationStore for Client {
    async fn register(&self, request: &RegistrationRequest) -> Result<String> {
        let body: Value = self.post("/register-session/", request).await?;
        find_id(&body, &["/session_detail/id", "/id"])
            .map(|id| id.to_string())
            .ok_or_else(|| SyncError::store("Registration response carried no id"))
    }

    async fn unregister(&self, registration_id: &str) -> Result<()> {
        Client::delete(self, &format!("/register-session/{}", registration_id)).await?;
        Ok(())
    }
}
