// HTTP tests for the Miseventos client against a mock backend
//
// Run with: cargo test -p miseventos-client --test http_test

use miseventos_client::{Client, ClientConfig};
use miseventos_core::{
    DraftList, RegistrationTracker, RemoteId, RemoteStore, Schedule, Session, Speaker, SyncError,
    SyncOutcome, ValidationContext,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;
    let client = Client::new(&ClientConfig::new(format!("{}/api/v1", server.uri()))).unwrap();
    (server, client)
}

fn speaker() -> Speaker {
    Speaker {
        full_name: "Ana Torres".to_string(),
        email: "ana@example.com".to_string(),
        bio: "Rust trainer and community organizer".to_string(),
    }
}

#[tokio::test]
async fn test_speaker_create_and_update() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/speaker/"))
        .and(body_json(json!({
            "full_name": "Ana Torres",
            "email": "ana@example.com",
            "bio": "Rust trainer and community organizer"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "error_message": null,
            "speaker": {"id": "sp-10", "created_at": "2025-01-01T00:00:00"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/speaker/"))
        .and(body_partial_json(json!({"id": "sp-10", "full_name": "Ana T."})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ValidationContext::default();
    let mut list = DraftList::new();
    let key = list.add(speaker());

    let id = list.create(key, &client, &ctx).await.unwrap();
    assert_eq!(id, RemoteId::new("sp-10"));

    list.set_field(key, "full_name", "Ana T.").unwrap();
    list.update(key, &client, &ctx).await.unwrap();
    assert!(!list.get(key).unwrap().state().is_dirty());
}

#[tokio::test]
async fn test_success_false_is_rejected_and_state_kept() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/speaker/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error_message": "El email ya está registrado",
            "speaker": null
        })))
        .mount(&server)
        .await;

    let mut list = DraftList::new();
    let key = list.add(speaker());
    let err = list
        .create(key, &client, &ValidationContext::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Rejected(ref m) if m == "El email ya está registrado"));
    assert!(list.get(key).unwrap().state().is_draft());
}

#[tokio::test]
async fn test_http_error_is_store_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/session/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = RemoteStore::<Session>::list(&client).await.unwrap_err();
    assert!(matches!(err, SyncError::Store(ref m) if m.contains("500")));
}

#[tokio::test]
async fn test_session_list_and_delete() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/session/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "error_message": null,
            "session": [{
                "id": "se-1",
                "title": "Ownership deep dive",
                "description": "Borrowing in practice",
                "created_at": "2025-01-01T00:00:00",
                "event_id": "ev-1",
                "capacity": 40,
                "speaker_id": "sp-1",
                "time_slot_id": "slot-1"
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/session/se-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "se-1", "success": true, "error_message": null, "session": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut list: DraftList<Session> = DraftList::new();
    assert_eq!(list.load(&client).await.unwrap(), 1);
    let record = list.iter().next().unwrap();
    assert_eq!(record.value().capacity, "40");
    assert_eq!(record.value().speaker_id, "sp-1");

    let key = record.key();
    list.delete(key, &client).await.unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_schedule_list_skips_events_without_slots() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/event/slot/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "error_message": null,
            "events": [
                {"id": "ev-1", "title": "With slots", "time_slot": [
                    {"id": "slot-1", "start_time": "09:00:00", "end_time": "10:00:00"},
                    {"id": "slot-2", "start_time": "10:00:00", "end_time": "11:30:00"}
                ]},
                {"id": "ev-2", "title": "Empty", "time_slot": []},
                {"id": "ev-3", "title": "Missing"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/slot/slot-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut list: DraftList<Schedule> = DraftList::new();
    assert_eq!(list.load(&client).await.unwrap(), 1);
    let key = list.iter().next().unwrap().key();
    assert_eq!(list.get(key).unwrap().value().time_ranges.len(), 2);

    list.remove_slot(key, 0, &client).await.unwrap();
    assert_eq!(list.get(key).unwrap().value().time_ranges[0].display(), "10:00-11:30");
}

#[tokio::test]
async fn test_schedule_create_without_id_uses_event_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/slot/"))
        .and(body_partial_json(json!({
            "event_id": "ev-5",
            "time_slots": [{"start_time": "09:00:00", "end_time": "17:00:00"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event_id": "ev-5",
            "time_slots": [],
            "is_assigned": false
        })))
        .mount(&server)
        .await;

    let mut list = DraftList::new();
    let key = list.add(Schedule::for_event("ev-5"));
    let id = list
        .create(key, &client, &ValidationContext::default())
        .await
        .unwrap();
    assert_eq!(id, RemoteId::new("ev-5"));
}

#[tokio::test]
async fn test_schedule_create_then_delete_removes_returned_slots() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/slot/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event_id": "ev-5",
            "time_slots": [
                {"id": "slot-7", "start_time": "09:00:00", "end_time": "17:00:00"}
            ],
            "is_assigned": false
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/slot/slot-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut list = DraftList::new();
    let key = list.add(Schedule::for_event("ev-5"));
    list.create(key, &client, &ValidationContext::default())
        .await
        .unwrap();
    assert_eq!(
        list.get(key).unwrap().value().time_ranges[0].slot_id,
        Some(RemoteId::new("slot-7"))
    );

    assert_eq!(list.delete(key, &client).await.unwrap(), SyncOutcome::Deleted);
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_schedule_without_slot_ids_refuses_delete() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/slot/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"event_id": "ev-5"})))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let mut list = DraftList::new();
    let key = list.add(Schedule::for_event("ev-5"));
    list.create(key, &client, &ValidationContext::default())
        .await
        .unwrap();

    let err = list.delete(key, &client).await.unwrap_err();
    assert!(matches!(err, SyncError::UnknownPartIds { .. }));
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_schedule_delete_retry_after_partial_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/event/slot/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "error_message": null,
            "events": [{"id": "ev-1", "title": "Meetup", "time_slot": [
                {"id": "s1", "start_time": "09:00:00", "end_time": "10:00:00"},
                {"id": "s2", "start_time": "10:00:00", "end_time": "11:00:00"}
            ]}]
        })))
        .mount(&server)
        .await;

    // s1 goes away on the first attempt and is unknown afterwards
    Mock::given(method("DELETE"))
        .and(path("/api/v1/slot/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/slot/s1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    // s2 fails once, then succeeds
    Mock::given(method("DELETE"))
        .and(path("/api/v1/slot/s2"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/slot/s2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut list: DraftList<Schedule> = DraftList::new();
    list.load(&client).await.unwrap();
    let key = list.iter().next().unwrap().key();

    let err = list.delete(key, &client).await.unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));
    assert_eq!(list.get(key).unwrap().value().time_ranges.len(), 2);

    assert_eq!(list.delete(key, &client).await.unwrap(), SyncOutcome::Deleted);
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_register_and_cancel_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/register-session/"))
        .and(body_json(json!({"event_id": "ev-1", "session_id": "se-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "error_message": null,
            "session_detail": {
                "id": "reg-1", "event_id": "ev-1", "session_id": "se-1", "number_registered": 3
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/register-session/reg-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut tracker = RegistrationTracker::new();
    let id = tracker.attend("ev-1", "se-1", &client).await.unwrap();
    assert_eq!(id, "reg-1");

    let before = tracker.clone();
    assert!(tracker.leave("se-1", &client).await.is_err());
    assert_eq!(tracker, before);
}

#[tokio::test]
async fn test_login_failure_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client.login("ana@example.com", "wrong-pass").await.unwrap_err();
    assert!(matches!(err, SyncError::Rejected(ref m) if m == "Fallo en la autenticación"));

    // Malformed emails never reach the backend
    let err = client.login("ana", "whatever").await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
}

#[tokio::test]
async fn test_login_keeps_session_cookie() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "access_token=tok-1; Path=/; HttpOnly")
                .set_body_json(json!({"success": true})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me/"))
        .and(header("cookie", "access_token=tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": {"id": "u-1", "email": "ana@example.com", "role": "admin"}
        })))
        .mount(&server)
        .await;

    let user = client.login("ana@example.com", "secret-pass").await.unwrap();
    assert!(user.is_admin());
    assert_eq!(client.cookie_header().as_deref(), Some("access_token=tok-1"));
}

#[tokio::test]
async fn test_me_without_session() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false, "error_message": "No autenticado", "user": null
        })))
        .mount(&server)
        .await;

    assert!(client.me().await.unwrap().is_none());
}

#[tokio::test]
async fn test_signup_validates_before_sending() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/user/register"))
        .and(body_json(json!({
            "email": "new@example.com",
            "password": "long-enough",
            "role": "assistant"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true, "id": "u-9"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.signup("new@example.com", "short").await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(ref e) if e.contains("password")));

    let id = client.signup("new@example.com", "long-enough").await.unwrap();
    assert_eq!(id, Some(RemoteId::new("u-9")));
}

#[tokio::test]
async fn test_discover_page() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/event/"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "error_message": null,
            "total": 6,
            "page": 2,
            "page_size": 5,
            "total_pages": 2,
            "events": []
        })))
        .mount(&server)
        .await;

    let page = client.discover(2, 5).await.unwrap();
    assert_eq!(page.total, 6);
    assert!(!page.has_next());
}
