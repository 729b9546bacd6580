// DraftList - the generic draft/sync container
//
// One ordered list of records of a single entity kind. Records are edited
// locally and pushed independently. Every state change goes through this type,
// so the Draft → Clean → Dirty transitions are enforced in one place.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{Result, SyncError};
use crate::state::{LocalKey, RemoteId, SyncOutcome, SyncState};
use crate::traits::RemoteStore;
use crate::validation::{FieldErrors, ValidationContext};

/// One record plus its sync state and the errors of its last validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord<E> {
    key: LocalKey,
    state: SyncState,
    value: E,
    #[serde(default, skip_serializing_if = "FieldErrors::is_empty")]
    errors: FieldErrors,
}

impl<E> DraftRecord<E> {
    pub fn key(&self) -> LocalKey {
        self.key
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn value(&self) -> &E {
        &self.value
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn remote_id(&self) -> Option<&RemoteId> {
        self.state.remote_id()
    }

    pub(crate) fn value_mut(&mut self) -> &mut E {
        &mut self.value
    }

    pub(crate) fn mark_edited(&mut self) {
        self.state.mark_edited();
    }
}

/// Ordered collection of records of one entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftList<E> {
    next_key: u32,
    records: Vec<DraftRecord<E>>,
}

impl<E> Default for DraftList<E> {
    fn default() -> Self {
        Self {
            next_key: 1,
            records: Vec::new(),
        }
    }
}

impl<E: Entity> DraftList<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new local draft
    pub fn add(&mut self, value: E) -> LocalKey {
        let key = self.allocate_key();
        self.records.push(DraftRecord {
            key,
            state: SyncState::Draft,
            value,
            errors: FieldErrors::new(),
        });
        tracing::debug!(kind = E::KIND, key = %key, "Draft added");
        key
    }

    pub fn get(&self, key: LocalKey) -> Option<&DraftRecord<E>> {
        self.records.iter().find(|r| r.key == key)
    }

    pub fn find_remote(&self, id: &RemoteId) -> Option<&DraftRecord<E>> {
        self.records.iter().find(|r| r.remote_id() == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DraftRecord<E>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records the backend knows about
    pub fn persisted_count(&self) -> usize {
        self.records.iter().filter(|r| r.state.is_persisted()).count()
    }

    /// Records with edits not yet pushed
    pub fn dirty_count(&self) -> usize {
        self.records.iter().filter(|r| r.state.is_dirty()).count()
    }

    /// Set one field by name; the record's error for that field is cleared
    pub fn set_field(&mut self, key: LocalKey, field: &str, value: &str) -> Result<()> {
        let record = self.record_mut(key)?;
        record.value.set_field(field, value)?;
        record.state.mark_edited();
        record.errors.remove(field);
        Ok(())
    }

    /// Apply an arbitrary edit; on success all stored errors are cleared
    pub fn edit<R>(&mut self, key: LocalKey, f: impl FnOnce(&mut E) -> Result<R>) -> Result<R> {
        let record = self.record_mut(key)?;
        let result = f(&mut record.value)?;
        record.state.mark_edited();
        record.errors.clear();
        Ok(result)
    }

    /// Validate a record and store the resulting error map on it
    pub fn validate(&mut self, key: LocalKey, ctx: &ValidationContext) -> Result<FieldErrors> {
        let record = self.record_mut(key)?;
        record.errors = record.value.validate(ctx);
        Ok(record.errors.clone())
    }

    /// Remove a record locally, whatever its state
    pub fn remove_local(&mut self, key: LocalKey) -> Result<DraftRecord<E>> {
        let index = self.position(key)?;
        Ok(self.records.remove(index))
    }

    /// Reload persisted records from the backend
    ///
    /// Drafts are kept. Persisted records are replaced by the fetched copies,
    /// keeping their local keys; records no longer listed are dropped.
    /// Returns the number of fetched records.
    pub async fn load<S>(&mut self, store: &S) -> Result<usize>
    where
        S: RemoteStore<E> + ?Sized,
    {
        let fetched = store.list().await.inspect_err(|e| {
            tracing::warn!(kind = E::KIND, error = %e, "Failed to load records");
        })?;
        let count = fetched.len();

        let discarded = self.dirty_count();
        if discarded > 0 {
            tracing::warn!(
                kind = E::KIND,
                discarded,
                "Reload discards unpushed edits"
            );
        }

        let mut previous: Vec<DraftRecord<E>> = std::mem::take(&mut self.records);
        for (id, value) in fetched {
            let key = previous
                .iter()
                .position(|r| r.remote_id() == Some(&id))
                .map(|i| previous.remove(i).key)
                .unwrap_or_else(|| self.allocate_key());
            self.records.push(DraftRecord {
                key,
                state: SyncState::Clean(id),
                value,
                errors: FieldErrors::new(),
            });
        }
        self.records
            .extend(previous.into_iter().filter(|r| r.state.is_draft()));

        tracing::debug!(kind = E::KIND, count, "Records loaded");
        Ok(count)
    }

    /// Persist a draft
    pub async fn create<S>(
        &mut self,
        key: LocalKey,
        store: &S,
        ctx: &ValidationContext,
    ) -> Result<RemoteId>
    where
        S: RemoteStore<E> + ?Sized,
    {
        let record = self.record_mut(key)?;
        if !record.state.can_create() {
            return Err(SyncError::AlreadyPersisted { kind: E::KIND });
        }
        Self::check(record, ctx)?;

        let confirmation = store.create(&record.value).await.inspect_err(|e| {
            tracing::warn!(kind = E::KIND, key = %key, error = %e, "Create failed");
        })?;

        let id = match confirmation.id {
            Some(id) => id,
            None => {
                let fallback = record
                    .value
                    .fallback_id()
                    .unwrap_or_else(|| RemoteId::placeholder(E::KIND));
                tracing::warn!(
                    kind = E::KIND,
                    key = %key,
                    id = %fallback,
                    "Create response carried no id; using fallback"
                );
                fallback
            }
        };

        record.state = SyncState::Clean(id.clone());
        record.value.confirmed(&confirmation.part_ids);
        tracing::info!(kind = E::KIND, key = %key, id = %id, "Record created");
        Ok(id)
    }

    /// Push local edits of a persisted record
    pub async fn update<S>(
        &mut self,
        key: LocalKey,
        store: &S,
        ctx: &ValidationContext,
    ) -> Result<SyncOutcome>
    where
        S: RemoteStore<E> + ?Sized,
    {
        let record = self.record_mut(key)?;
        let id = match &record.state {
            SyncState::Draft => return Err(SyncError::NotPersisted { kind: E::KIND }),
            SyncState::Clean(_) => return Ok(SyncOutcome::Unchanged),
            SyncState::Dirty(id) => id.clone(),
        };
        if id.is_placeholder() {
            return Err(SyncError::PlaceholderId(id));
        }
        Self::check(record, ctx)?;

        let confirmation = store.update(&id, &record.value).await.inspect_err(|e| {
            tracing::warn!(kind = E::KIND, key = %key, id = %id, error = %e, "Update failed");
        })?;

        record.state = SyncState::Clean(id.clone());
        record.value.confirmed(&confirmation.part_ids);
        tracing::info!(kind = E::KIND, key = %key, id = %id, "Record updated");
        Ok(SyncOutcome::Updated)
    }

    /// Create drafts, update dirty records, leave clean ones alone
    pub async fn push<S>(
        &mut self,
        key: LocalKey,
        store: &S,
        ctx: &ValidationContext,
    ) -> Result<SyncOutcome>
    where
        S: RemoteStore<E> + ?Sized,
    {
        let is_draft = self
            .get(key)
            .ok_or(SyncError::UnknownRecord(key))?
            .state
            .is_draft();
        if is_draft {
            self.create(key, store, ctx).await.map(SyncOutcome::Created)
        } else {
            self.update(key, store, ctx).await
        }
    }

    /// Delete a record
    ///
    /// Drafts are removed locally. Persisted records are deleted remotely
    /// first and removed locally only if the backend reports success.
    pub async fn delete<S>(&mut self, key: LocalKey, store: &S) -> Result<SyncOutcome>
    where
        S: RemoteStore<E> + ?Sized,
    {
        let index = self.position(key)?;
        let record = &self.records[index];
        let id = match record.remote_id() {
            None => {
                self.records.remove(index);
                tracing::debug!(kind = E::KIND, key = %key, "Draft discarded");
                return Ok(SyncOutcome::Discarded);
            }
            Some(id) => id.clone(),
        };
        if id.is_placeholder() {
            return Err(SyncError::PlaceholderId(id));
        }
        record.value.check_deletable()?;

        store.delete(&id, &record.value).await.inspect_err(|e| {
            tracing::warn!(kind = E::KIND, key = %key, id = %id, error = %e, "Delete failed");
        })?;

        self.records.remove(index);
        tracing::info!(kind = E::KIND, key = %key, id = %id, "Record deleted");
        Ok(SyncOutcome::Deleted)
    }

    pub(crate) fn record_mut(&mut self, key: LocalKey) -> Result<&mut DraftRecord<E>> {
        self.records
            .iter_mut()
            .find(|r| r.key == key)
            .ok_or(SyncError::UnknownRecord(key))
    }

    fn position(&self, key: LocalKey) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.key == key)
            .ok_or(SyncError::UnknownRecord(key))
    }

    fn allocate_key(&mut self) -> LocalKey {
        let key = LocalKey::new(self.next_key);
        self.next_key += 1;
        key
    }

    fn check(record: &mut DraftRecord<E>, ctx: &ValidationContext) -> Result<()> {
        record.errors = record.value.validate(ctx);
        if record.errors.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            kind = E::KIND,
            key = %record.key,
            errors = %record.errors,
            "Validation failed"
        );
        Err(SyncError::Validation(record.errors.clone()))
    }
}
