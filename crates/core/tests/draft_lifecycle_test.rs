// Integration tests for the draft/sync lifecycle with in-memory stores
//
// These tests walk records through Draft → Clean → Dirty → Clean and check
// which store calls each step produces.
//
// Run with: cargo test -p miseventos-core --test draft_lifecycle_test

use chrono::{NaiveDate, NaiveTime};
use miseventos_core::memory::{Failure, InMemoryRegistrationStore, InMemoryStore, StoreCall};
use miseventos_core::{
    DraftList, Event, RegistrationTracker, RemoteId, Schedule, Speaker, SyncError, SyncOutcome,
    SyncState, TimeRange, ValidationContext,
};

fn ctx() -> ValidationContext {
    let now = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    ValidationContext::at(now)
}

fn speaker() -> Speaker {
    Speaker {
        full_name: "Lucía Gómez".to_string(),
        email: "lucia@example.com".to_string(),
        bio: "Organizes community meetups in Lima".to_string(),
    }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn test_invalid_draft_never_reaches_store() {
    let store = InMemoryStore::<Event>::new();
    let mut list = DraftList::new();
    let key = list.add(Event::default());

    let err = list.create(key, &store, &ctx()).await.unwrap_err();
    let SyncError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.contains("title"));
    assert!(errors.contains("capacity"));
    assert!(store.calls().await.is_empty());
    assert!(list.get(key).unwrap().state().is_draft());
    assert_eq!(list.get(key).unwrap().errors(), &errors);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let store = InMemoryStore::<Speaker>::new();
    let mut list = DraftList::new();
    let key = list.add(speaker());

    // Draft → Clean
    let id = list.create(key, &store, &ctx()).await.unwrap();
    assert_eq!(id, RemoteId::new("speaker-1"));
    assert_eq!(list.get(key).unwrap().state(), &SyncState::Clean(id.clone()));

    // Create is no longer available
    let err = list.create(key, &store, &ctx()).await.unwrap_err();
    assert!(matches!(err, SyncError::AlreadyPersisted { .. }));

    // Clean → Dirty
    list.set_field(key, "full_name", "Lucía G.").unwrap();
    assert!(list.get(key).unwrap().state().is_dirty());
    assert_eq!(list.dirty_count(), 1);

    // Dirty → Clean
    let outcome = list.push(key, &store, &ctx()).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Updated);
    assert!(!list.get(key).unwrap().state().is_dirty());

    let calls = store.calls().await;
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], StoreCall::Create(body) if body["full_name"] == "Lucía Gómez"));
    assert!(matches!(&calls[1], StoreCall::Update(remote, body)
        if remote == &id && body["id"] == "speaker-1" && body["full_name"] == "Lucía G."));
}

#[tokio::test]
async fn test_update_requires_persisted_record() {
    let store = InMemoryStore::<Speaker>::new();
    let mut list = DraftList::new();
    let key = list.add(speaker());

    let err = list.update(key, &store, &ctx()).await.unwrap_err();
    assert!(matches!(err, SyncError::NotPersisted { kind: "speaker" }));
    assert!(store.calls().await.is_empty());
}

#[tokio::test]
async fn test_failed_update_stays_dirty() {
    let store = InMemoryStore::<Speaker>::new();
    store.seed(RemoteId::new("sp-9"), speaker()).await;
    let mut list = DraftList::new();
    list.load(&store).await.unwrap();
    let key = list.iter().next().unwrap().key();

    list.set_field(key, "email", "other@example.com").unwrap();
    store.fail_with(Failure::Rejected).await;
    let err = list.update(key, &store, &ctx()).await.unwrap_err();
    assert!(err.is_remote());
    assert!(list.get(key).unwrap().state().is_dirty());
    assert_eq!(list.get(key).unwrap().value().email, "other@example.com");

    store.recover().await;
    list.update(key, &store, &ctx()).await.unwrap();
    assert_eq!(store.records().await[0].1.email, "other@example.com");
}

#[tokio::test]
async fn test_delete_semantics() {
    let store = InMemoryStore::<Speaker>::new();
    store.seed(RemoteId::new("sp-1"), speaker()).await;
    let mut list = DraftList::new();
    list.load(&store).await.unwrap();
    let persisted = list.iter().next().unwrap().key();
    let draft = list.add(Speaker::default());

    // Drafts go away without a network call
    assert_eq!(
        list.delete(draft, &store).await.unwrap(),
        SyncOutcome::Discarded
    );
    assert_eq!(store.calls().await, vec![StoreCall::List]);

    // Persisted records survive a failed delete
    store.fail_with(Failure::Transport).await;
    assert!(list.delete(persisted, &store).await.is_err());
    assert!(list.get(persisted).is_some());

    store.recover().await;
    assert_eq!(
        list.delete(persisted, &store).await.unwrap(),
        SyncOutcome::Deleted
    );
    assert!(list.is_empty());
    assert!(store.records().await.is_empty());
}

#[tokio::test]
async fn test_schedule_without_returned_id_uses_event_id() {
    let store = InMemoryStore::<Schedule>::new();
    store.omit_ids_on_create().await;

    let mut list = DraftList::new();
    let key = list.add(Schedule::for_event("ev-42"));
    let id = list.create(key, &store, &ctx()).await.unwrap();

    assert_eq!(id, RemoteId::new("ev-42"));
    assert!(!id.is_placeholder());
}

#[tokio::test]
async fn test_schedule_with_unknown_slot_ids_is_not_deleted() {
    let store = InMemoryStore::<Schedule>::new();
    let mut list = DraftList::new();
    let key = list.add(Schedule::for_event("ev-8"));
    list.create(key, &store, &ctx()).await.unwrap();

    let err = list.delete(key, &store).await.unwrap_err();
    assert!(matches!(err, SyncError::UnknownPartIds { kind: "schedule" }));
    assert_eq!(list.len(), 1);
    assert!(!store
        .calls()
        .await
        .iter()
        .any(|call| matches!(call, StoreCall::Delete(_))));

    // Removing the unidentified range is refused as well
    list.edit(key, |schedule| {
        schedule.add_range(t(18, 0), t(19, 0));
        Ok(())
    })
    .unwrap();
    let err = list.remove_slot(key, 0, &store).await.unwrap_err();
    assert!(matches!(err, SyncError::UnknownPartIds { .. }));

    // A fresh range was never saved and goes away locally
    list.remove_slot(key, 1, &store).await.unwrap();
    assert_eq!(list.get(key).unwrap().value().time_ranges.len(), 1);
}

#[tokio::test]
async fn test_remove_slot_deletes_remote_slot() {
    let store = InMemoryStore::<Schedule>::new();
    let mut schedule = Schedule::for_event("ev-1");
    schedule.time_ranges = vec![
        TimeRange::from_slot(RemoteId::new("slot-1"), t(9, 0), t(10, 0)),
        TimeRange::from_slot(RemoteId::new("slot-2"), t(10, 0), t(11, 0)),
    ];
    store.seed(RemoteId::new("ev-1"), schedule).await;

    let mut list = DraftList::new();
    list.load(&store).await.unwrap();
    let key = list.iter().next().unwrap().key();

    list.remove_slot(key, 0, &store).await.unwrap();
    let record = list.get(key).unwrap();
    assert_eq!(record.value().time_ranges.len(), 1);
    assert!(record.state().is_dirty());
    assert!(store
        .calls()
        .await
        .contains(&StoreCall::DeleteSlot(RemoteId::new("slot-1"))));

    // The last range cannot be removed
    let err = list.remove_slot(key, 0, &store).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidValue { .. }));
}

#[tokio::test]
async fn test_event_start_date_check_only_when_moved() {
    let store = InMemoryStore::<Event>::new();
    let mut list = DraftList::new();
    let key = list.add(Event::default());
    list.set_field(key, "title", "Rust Lima").unwrap();
    list.set_field(key, "description", "Monthly meetup").unwrap();
    list.set_field(key, "start_date", "2025-02-01T18:00").unwrap();
    list.set_field(key, "end_date", "2025-02-01T21:00").unwrap();
    list.set_field(key, "capacity", "80").unwrap();
    list.create(key, &store, &ctx()).await.unwrap();

    // A month later the confirmed start date is in the past but unchanged
    let later = ValidationContext::at(
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    );
    list.set_field(key, "capacity", "90").unwrap();
    assert_eq!(
        list.update(key, &store, &later).await.unwrap(),
        SyncOutcome::Updated
    );
}

#[tokio::test]
async fn test_registration_rollback_restores_exact_state() {
    let store = InMemoryRegistrationStore::new();
    let mut tracker = RegistrationTracker::new();

    let first = tracker.attend("ev-1", "se-1", &store).await.unwrap();
    let before = tracker.clone();

    store.fail_with(Failure::Transport).await;
    assert!(tracker.attend("ev-1", "se-2", &store).await.is_err());
    assert_eq!(tracker, before);

    assert!(tracker.leave("se-1", &store).await.is_err());
    assert_eq!(tracker, before);
    assert_eq!(
        tracker.registration("se-1").and_then(|r| r.id()),
        Some(first.as_str())
    );
}
