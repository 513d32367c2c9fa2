use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use sessionscope_core::activity::{ActivityEvent, EventDataField};
use sessionscope_core::config::{AuthMode, Config, StorageMode};
use sessionscope_server::{app::build_app, state::AppState};
use sessionscope_sqlite::SqliteBackend;

const BASE_MS: i64 = 1_750_000_000_000;

fn ts(offset_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(BASE_MS + offset_ms).expect("timestamp")
}

fn test_config(auth_mode: AuthMode) -> Config {
    Config {
        port: 0,
        data_dir: "./data".to_string(),
        storage_mode: StorageMode::Relational,
        auth_mode,
        cors_origins: Vec::new(),
    }
}

fn string_field(key: &str, value: &str) -> EventDataField {
    EventDataField {
        data_key: key.to_string(),
        string_value: Some(value.to_string()),
        number_value: None,
        date_value: None,
    }
}

async fn seeded_state(auth_mode: AuthMode) -> Arc<AppState> {
    let db = SqliteBackend::open_in_memory().expect("db");
    db.seed_website("site_1", "Example", "example.com")
        .await
        .expect("seed");

    db.insert_event(
        "site_1",
        "sess_1",
        &ActivityEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            visit_id: "visit_1".to_string(),
            created_at: ts(100),
            url_path: Some("/".to_string()),
            url_query: None,
            referrer_domain: Some("google.com".to_string()),
            event_type: "pageview".to_string(),
            event_name: None,
            event_data: Vec::new(),
        },
    )
    .await
    .expect("insert");

    db.insert_event(
        "site_1",
        "sess_1",
        &ActivityEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            visit_id: "visit_1".to_string(),
            created_at: ts(200),
            url_path: Some("/account".to_string()),
            url_query: None,
            referrer_domain: None,
            event_type: "event".to_string(),
            event_name: Some("profile_identified".to_string()),
            event_data: vec![
                string_field("caseId", "C123"),
                string_field("phone_number", "5551234567"),
            ],
        },
    )
    .await
    .expect("insert");

    Arc::new(AppState::new(Arc::new(db), test_config(auth_mode)))
}

fn activity_uri(website_id: &str, session_id: &str, start_ms: i64, end_ms: i64) -> String {
    format!(
        "/api/websites/{website_id}/sessions/{session_id}/activity?startAt={}&endAt={}",
        BASE_MS + start_ms,
        BASE_MS + end_ms
    )
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn returns_masked_normalized_activity() {
    let state = seeded_state(AuthMode::None).await;
    let app = build_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri(activity_uri("site_1", "sess_1", 0, 1000))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);

    // Newest first: the profile event precedes the pageview.
    assert_eq!(data[0]["eventName"], "profile_identify_C123_****4567");
    assert_eq!(data[0]["eventType"], "event");
    assert_eq!(data[1]["eventName"], Value::Null);
    assert_eq!(data[1]["urlPath"], "/");

    for item in data {
        let obj = item.as_object().expect("object");
        assert!(!obj.contains_key("eventData"));
        assert!(obj.contains_key("visitId"));
        assert!(obj.contains_key("createdAt"));
    }
}

#[tokio::test]
async fn unknown_website_is_404() {
    let state = seeded_state(AuthMode::None).await;
    let app = build_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri(activity_uri("site_unknown", "sess_1", 0, 1000))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn missing_time_bounds_are_rejected() {
    let state = seeded_state(AuthMode::None).await;
    let app = build_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/websites/site_1/sessions/sess_1/activity")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inverted_window_returns_empty_data() {
    let state = seeded_state(AuthMode::None).await;
    let app = build_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri(activity_uri("site_1", "sess_1", 1000, 0))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().expect("data").len(), 0);
}

#[tokio::test]
async fn token_mode_requires_bearer_header() {
    let state = seeded_state(AuthMode::Token("secret".to_string())).await;
    let app = build_app(Arc::clone(&state));

    let response = app
        .oneshot(
            Request::builder()
                .uri(activity_uri("site_1", "sess_1", 0, 1000))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = build_app(state);
    let response = app
        .oneshot(
            Request::builder()
                .uri(activity_uri("site_1", "sess_1", 0, 1000))
                .header(header::AUTHORIZATION, "Bearer secret")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_is_open_even_in_token_mode() {
    let state = seeded_state(AuthMode::Token("secret".to_string())).await;
    let app = build_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}
