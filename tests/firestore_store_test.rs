use httpmock::prelude::*;
use jumuia_booking::domain::model::{FieldFilter, Fields};
use jumuia_booking::{
    BookingError, Collections, DocumentStore, FirestoreSettings, FirestoreStore,
    ReservationService,
};
use chrono::{FixedOffset, TimeZone, Utc};
use serde_json::{json, Value};
use std::time::Duration;

const DOCS: &str = "/v1/projects/parish/databases/(default)/documents";

fn store_for(server: &MockServer, api_key: Option<&str>) -> FirestoreStore {
    FirestoreStore::new(FirestoreSettings {
        base_url: server.base_url(),
        project_id: "parish".to_string(),
        database: "(default)".to_string(),
        api_key: api_key.map(str::to_string),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn doc_name(collection: &str, id: &str) -> String {
    format!("projects/parish/databases/(default)/documents/{}/{}", collection, id)
}

fn reservation_doc(id: &str, name: &str, reservation_time: &str) -> Value {
    json!({
        "name": doc_name("reservations", id),
        "fields": {
            "name": {"stringValue": name},
            "date": {"stringValue": &reservation_time[..10]},
            "time": {"stringValue": &reservation_time[11..16]},
            "room": {"stringValue": "Hall"},
            "reservationTime": {"stringValue": reservation_time}
        },
        "createTime": "2024-05-01T00:00:00.000000Z",
        "updateTime": "2024-05-01T00:00:00.000000Z"
    })
}

#[tokio::test]
async fn test_list_all_follows_page_tokens() {
    let server = MockServer::start_async().await;

    // 帶 pageToken 的請求要先註冊
    let second_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/rooms", DOCS))
                .query_param("key", "secret")
                .query_param("pageToken", "page-2");
            then.status(200).json_body(json!({
                "documents": [
                    {"name": doc_name("rooms", "r2"), "fields": {"name": {"stringValue": "Chapel"}}}
                ]
            }));
        })
        .await;
    let first_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/rooms", DOCS))
                .query_param("key", "secret")
                .query_param("pageSize", "300");
            then.status(200).json_body(json!({
                "documents": [
                    {"name": doc_name("rooms", "r1"), "fields": {"name": {"stringValue": "Hall"}}}
                ],
                "nextPageToken": "page-2"
            }));
        })
        .await;

    let store = store_for(&server, Some("secret"));
    let docs = store.list_all("rooms").await.unwrap();

    first_page.assert_async().await;
    second_page.assert_async().await;
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "r1");
    assert_eq!(docs[0].fields["name"], "Hall");
    assert_eq!(docs[1].id, "r2");
}

#[tokio::test]
async fn test_list_all_empty_collection() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/jumuiaGroups", DOCS));
            then.status(200).json_body(json!({}));
        })
        .await;

    let store = store_for(&server, None);
    let docs = store.list_all("jumuiaGroups").await.unwrap();

    mock.assert_async().await;
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_insert_encodes_fields_and_returns_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/reservations", DOCS))
                .json_body(json!({
                    "fields": {
                        "name": {"stringValue": "St. Joseph"},
                        "reservationTime": {"stringValue": "2024-06-01T07:00:00.000Z"}
                    }
                }));
            then.status(200)
                .json_body(reservation_doc("new-id", "St. Joseph", "2024-06-01T07:00:00.000Z"));
        })
        .await;

    let fields: Fields = match json!({
        "name": "St. Joseph",
        "reservationTime": "2024-06-01T07:00:00.000Z"
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };

    let store = store_for(&server, None);
    let id = store.insert("reservations", fields).await.unwrap();

    mock.assert_async().await;
    assert_eq!(id, "new-id");
}

#[tokio::test]
async fn test_delete_targets_document_path() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(format!("{}/reservations/abc", DOCS))
                .query_param("key", "secret");
            then.status(200).json_body(json!({}));
        })
        .await;

    let store = store_for(&server, Some("secret"));
    store.delete("reservations", "abc").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_where_sends_less_than_query() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}:runQuery", DOCS))
                .json_body(json!({
                    "structuredQuery": {
                        "from": [{"collectionId": "reservations"}],
                        "where": {
                            "fieldFilter": {
                                "field": {"fieldPath": "reservationTime"},
                                "op": "LESS_THAN",
                                "value": {"stringValue": "2024-06-01T08:00:00.000Z"}
                            }
                        }
                    }
                }));
            then.status(200).json_body(json!([
                {"document": reservation_doc("old", "Group A", "2024-06-01T07:00:00.000Z"), "readTime": "2024-06-01T08:00:00Z"}
            ]));
        })
        .await;

    let store = store_for(&server, None);
    let filter = FieldFilter::less_than("reservationTime", "2024-06-01T08:00:00.000Z");
    let docs = store.list_where("reservations", &filter).await.unwrap();

    mock.assert_async().await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "old");
}

#[tokio::test]
async fn test_list_where_without_matches() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}:runQuery", DOCS));
            then.status(200)
                .json_body(json!([{"readTime": "2024-06-01T08:00:00Z"}]));
        })
        .await;

    let store = store_for(&server, None);
    let filter = FieldFilter::less_than("reservationTime", "2024-06-01T08:00:00.000Z");
    assert!(store.list_where("reservations", &filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_becomes_store_error() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/rooms", DOCS));
            then.status(403).json_body(json!({
                "error": {
                    "code": 403,
                    "message": "Missing or insufficient permissions.",
                    "status": "PERMISSION_DENIED"
                }
            }));
        })
        .await;

    let store = store_for(&server, None);
    let err = store.list_all("rooms").await.unwrap_err();

    match err {
        BookingError::Store { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Missing or insufficient permissions.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_typed_value_is_reported() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/rooms", DOCS));
            then.status(200).json_body(json!({
                "documents": [
                    {"name": doc_name("rooms", "r1"), "fields": {"name": {"mysteryValue": 1}}}
                ]
            }));
        })
        .await;

    let store = store_for(&server, None);
    let err = store.list_all("rooms").await.unwrap_err();
    assert!(matches!(err, BookingError::MalformedDocument { ref id, .. } if id == "r1"));
}

#[tokio::test]
async fn test_service_sweep_over_firestore() {
    let server = MockServer::start_async().await;
    let query = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{}:runQuery", DOCS));
            then.status(200).json_body(json!([
                {"document": reservation_doc("old", "Group A", "2024-06-01T07:00:00.000Z")}
            ]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{}/reservations/old", DOCS));
            then.status(200).json_body(json!({}));
        })
        .await;

    let service = ReservationService::with_settings(
        store_for(&server, None),
        Collections::default(),
        FixedOffset::east_opt(0).unwrap(),
    );
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let report = service.sweep_expired(now).await.unwrap();

    query.assert_async().await;
    delete.assert_async().await;
    assert_eq!(report.deleted, vec!["old".to_string()]);
}
