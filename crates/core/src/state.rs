// Record identity and sync state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const PLACEHOLDER_PREFIX: &str = "placeholder-";

/// Client-side key of a record inside a DraftList (stable across reloads)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalKey(u32);

impl LocalKey {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(LocalKey)
    }
}

/// Identifier assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Client-generated stand-in used when a create response carries no id
    pub fn placeholder(kind: &str) -> Self {
        Self(format!("{}{}-{}", PLACEHOLDER_PREFIX, kind, Uuid::now_v7()))
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RemoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Where a record stands relative to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum SyncState {
    /// Never successfully persisted
    Draft,
    /// Persisted and matching the last known backend state
    Clean(RemoteId),
    /// Persisted with local edits not yet pushed
    Dirty(RemoteId),
}

impl SyncState {
    pub fn remote_id(&self) -> Option<&RemoteId> {
        match self {
            SyncState::Draft => None,
            SyncState::Clean(id) | SyncState::Dirty(id) => Some(id),
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, SyncState::Draft)
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, SyncState::Dirty(_))
    }

    pub fn is_persisted(&self) -> bool {
        !self.is_draft()
    }

    /// "Create" is only meaningful for drafts
    pub fn can_create(&self) -> bool {
        self.is_draft()
    }

    /// "Update" is only meaningful when there is something to push
    pub fn can_update(&self) -> bool {
        self.is_dirty()
    }

    /// Transition applied on any local edit
    pub fn mark_edited(&mut self) {
        if let SyncState::Clean(id) = self {
            *self = SyncState::Dirty(id.clone());
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyncState::Draft => "draft",
            SyncState::Clean(_) => "clean",
            SyncState::Dirty(_) => "dirty",
        }
    }
}

/// What the backend answered to a create or update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Confirmation {
    /// Id of the record, when the response carried one
    pub id: Option<RemoteId>,
    /// Ids of nested parts (schedule slots) listed in the response
    pub part_ids: Vec<RemoteId>,
}

impl Confirmation {
    pub fn with_id(id: RemoteId) -> Self {
        Self {
            id: Some(id),
            part_ids: Vec::new(),
        }
    }
}

/// Result of a sync operation on one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Record persisted for the first time
    Created(RemoteId),
    /// Local edits pushed
    Updated,
    /// Nothing to do (record already clean)
    Unchanged,
    /// Record deleted remotely and removed locally
    Deleted,
    /// Draft removed locally without a network call
    Discarded,
}
