// In-memory implementations for examples and testing
//
// These stores keep all data in memory and record every call they receive,
// so tests can assert both on resulting state and on what would have gone
// over the wire. Failures can be injected to exercise error paths.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::entity::Entity;
use crate::error::{Result, SyncError};
use crate::registration::RegistrationRequest;
use crate::schedule::Schedule;
use crate::state::{Confirmation, RemoteId};
use crate::traits::{RegistrationStore, RemoteStore, SlotStore};

/// A call received by an in-memory store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List,
    Create(serde_json::Value),
    Update(RemoteId, serde_json::Value),
    Delete(RemoteId),
    DeleteSlot(RemoteId),
    Register(RegistrationRequest),
    Unregister(String),
}

/// Failure mode injected into a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Behave like an unreachable backend
    Transport,
    /// Behave like a backend answering `success: false`
    Rejected,
}

impl Failure {
    fn error(self, op: &str) -> SyncError {
        match self {
            Failure::Transport => SyncError::store(format!("{op}: connection refused")),
            Failure::Rejected => SyncError::rejected(format!("{op}: rejected by backend")),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

// ============================================================================
// InMemoryStore - Remote collection for one entity kind
// ============================================================================

#[derive(Debug)]
struct StoreState<E> {
    records: BTreeMap<RemoteId, E>,
    calls: Vec<StoreCall>,
    failure: Option<Failure>,
    omit_ids: bool,
    next_id: u64,
}

impl<E> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            calls: Vec::new(),
            failure: None,
            omit_ids: false,
            next_id: 1,
        }
    }
}

impl<E> StoreState<E> {
    fn record(&mut self, call: StoreCall, op: &str) -> Result<()> {
        self.calls.push(call);
        match self.failure {
            Some(failure) => Err(failure.error(op)),
            None => Ok(()),
        }
    }
}

/// In-memory backend collection
///
/// Created records get ids of the form `{kind}-{n}`. Nested part ids are
/// never reported.
#[derive(Debug, Clone)]
pub struct InMemoryStore<E> {
    state: Arc<RwLock<StoreState<E>>>,
}

impl<E> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a persisted record (not recorded as a call)
    pub async fn seed(&self, id: RemoteId, value: E) {
        self.state.write().await.records.insert(id, value);
    }

    /// Fail every following call
    pub async fn fail_with(&self, failure: Failure) {
        self.state.write().await.failure = Some(failure);
    }

    /// Stop failing
    pub async fn recover(&self) {
        self.state.write().await.failure = None;
    }

    /// Answer creates without an id, like some backend endpoints do
    pub async fn omit_ids_on_create(&self) {
        self.state.write().await.omit_ids = true;
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn records(&self) -> Vec<(RemoteId, E)> {
        self.state
            .read()
            .await
            .records
            .iter()
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect()
    }
}

#[async_trait]
impl<E: Entity> RemoteStore<E> for InMemoryStore<E> {
    async fn list(&self) -> Result<Vec<(RemoteId, E)>> {
        let mut state = self.state.write().await;
        state.record(StoreCall::List, "list")?;
        Ok(state
            .records
            .iter()
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect())
    }

    async fn create(&self, value: &E) -> Result<Confirmation> {
        let mut state = self.state.write().await;
        state.record(StoreCall::Create(to_json(&value.payload(None))), "create")?;

        let id = RemoteId::new(format!("{}-{}", E::KIND, state.next_id));
        state.next_id += 1;
        state.records.insert(id.clone(), value.clone());

        Ok(Confirmation {
            id: (!state.omit_ids).then_some(id),
            part_ids: Vec::new(),
        })
    }

    async fn update(&self, id: &RemoteId, value: &E) -> Result<Confirmation> {
        let mut state = self.state.write().await;
        state.record(
            StoreCall::Update(id.clone(), to_json(&value.payload(Some(id)))),
            "update",
        )?;
        match state.records.get_mut(id) {
            Some(existing) => {
                *existing = value.clone();
                Ok(Confirmation::default())
            }
            None => Err(SyncError::rejected(format!("{} {id} not found", E::KIND))),
        }
    }

    async fn delete(&self, id: &RemoteId, _value: &E) -> Result<()> {
        let mut state = self.state.write().await;
        state.record(StoreCall::Delete(id.clone()), "delete")?;
        state
            .records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SyncError::rejected(format!("{} {id} not found", E::KIND)))
    }
}

#[async_trait]
impl SlotStore for InMemoryStore<Schedule> {
    async fn delete_slot(&self, slot_id: &RemoteId) -> Result<()> {
        let mut state = self.state.write().await;
        state.record(StoreCall::DeleteSlot(slot_id.clone()), "delete slot")?;
        for schedule in state.records.values_mut() {
            schedule
                .time_ranges
                .retain(|range| range.slot_id.as_ref() != Some(slot_id));
        }
        Ok(())
    }
}

// ============================================================================
// InMemoryRegistrationStore - Session registrations
// ============================================================================

#[derive(Debug, Default)]
struct RegistrationState {
    active: BTreeMap<String, RegistrationRequest>,
    calls: Vec<StoreCall>,
    failure: Option<Failure>,
    next_id: u64,
}

/// In-memory registration backend
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistrationStore {
    state: Arc<RwLock<RegistrationState>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, failure: Failure) {
        self.state.write().await.failure = Some(failure);
    }

    pub async fn recover(&self) {
        self.state.write().await.failure = None;
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.state.read().await.calls.clone()
    }

    /// Register requests received so far, failed ones included
    pub async fn requests(&self) -> Vec<RegistrationRequest> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::Register(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Registrations currently held by the backend
    pub async fn active(&self) -> Vec<(String, RegistrationRequest)> {
        self.state
            .read()
            .await
            .active
            .iter()
            .map(|(id, request)| (id.clone(), request.clone()))
            .collect()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn register(&self, request: &RegistrationRequest) -> Result<String> {
        let mut state = self.state.write().await;
        state.calls.push(StoreCall::Register(request.clone()));
        if let Some(failure) = state.failure {
            return Err(failure.error("register"));
        }

        state.next_id += 1;
        let id = format!("reg-{}", state.next_id);
        state.active.insert(id.clone(), request.clone());
        Ok(id)
    }

    async fn unregister(&self, registration_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .calls
            .push(StoreCall::Unregister(registration_id.to_string()));
        if let Some(failure) = state.failure {
            return Err(failure.error("unregister"));
        }

        state
            .active
            .remove(registration_id)
            .map(|_| ())
            .ok_or_else(|| SyncError::rejected(format!("registration {registration_id} not found")))
    }
}
