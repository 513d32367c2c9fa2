use chrono::{DateTime, Utc};

use sessionscope_core::activity::{
    ActivityBackend, ActivityEvent, EventDataField, MAX_ACTIVITY_EVENTS,
};
use sessionscope_sqlite::SqliteBackend;

const BASE_MS: i64 = 1_750_000_000_000;

fn ts(offset_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(BASE_MS + offset_ms).expect("timestamp")
}

fn pageview(event_id: &str, offset_ms: i64) -> ActivityEvent {
    ActivityEvent {
        event_id: event_id.to_string(),
        visit_id: "visit_1".to_string(),
        created_at: ts(offset_ms),
        url_path: Some("/pricing".to_string()),
        url_query: None,
        referrer_domain: Some("google.com".to_string()),
        event_type: "pageview".to_string(),
        event_name: None,
        event_data: Vec::new(),
    }
}

async fn seeded_backend() -> SqliteBackend {
    let db = SqliteBackend::open_in_memory().expect("db");
    db.seed_website("site_1", "Example", "example.com")
        .await
        .expect("seed");
    db
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let db = seeded_backend().await;
    db.insert_event("site_1", "sess_1", &pageview("ev_before", -1))
        .await
        .expect("insert");
    db.insert_event("site_1", "sess_1", &pageview("ev_start", 0))
        .await
        .expect("insert");
    db.insert_event("site_1", "sess_1", &pageview("ev_end", 1000))
        .await
        .expect("insert");
    db.insert_event("site_1", "sess_1", &pageview("ev_after", 1001))
        .await
        .expect("insert");

    let events = db
        .get_session_activity("site_1", "sess_1", ts(0), ts(1000))
        .await
        .expect("query");

    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, ["ev_end", "ev_start"]);
}

#[tokio::test]
async fn results_are_newest_first() {
    let db = seeded_backend().await;
    for (id, offset) in [("a", 300), ("b", 100), ("c", 200)] {
        db.insert_event("site_1", "sess_1", &pageview(id, offset))
            .await
            .expect("insert");
    }

    let events = db
        .get_session_activity("site_1", "sess_1", ts(0), ts(1000))
        .await
        .expect("query");

    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, ["a", "c", "b"]);
}

#[tokio::test]
async fn caps_at_500_most_recent() {
    let db = seeded_backend().await;
    for i in 0..(MAX_ACTIVITY_EVENTS as i64 + 10) {
        db.insert_event("site_1", "sess_1", &pageview(&format!("ev_{i}"), i * 1000))
            .await
            .expect("insert");
    }

    let events = db
        .get_session_activity("site_1", "sess_1", ts(0), ts(600_000_000))
        .await
        .expect("query");

    assert_eq!(events.len(), MAX_ACTIVITY_EVENTS);
    // The 10 oldest fall off; the newest survives at the front.
    assert_eq!(events[0].event_id, "ev_509");
    assert_eq!(events[events.len() - 1].event_id, "ev_10");
}

#[tokio::test]
async fn inverted_window_yields_empty_not_error() {
    let db = seeded_backend().await;
    db.insert_event("site_1", "sess_1", &pageview("ev_1", 500))
        .await
        .expect("insert");

    let events = db
        .get_session_activity("site_1", "sess_1", ts(1000), ts(0))
        .await
        .expect("query");
    assert!(events.is_empty());
}

#[tokio::test]
async fn other_sessions_and_websites_are_excluded() {
    let db = seeded_backend().await;
    db.seed_website("site_2", "Other", "other.com")
        .await
        .expect("seed");
    db.insert_event("site_1", "sess_1", &pageview("mine", 100))
        .await
        .expect("insert");
    db.insert_event("site_1", "sess_2", &pageview("other_session", 100))
        .await
        .expect("insert");
    db.insert_event("site_2", "sess_1", &pageview("other_site", 100))
        .await
        .expect("insert");

    let events = db
        .get_session_activity("site_1", "sess_1", ts(0), ts(1000))
        .await
        .expect("query");
    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, ["mine"]);
}

#[tokio::test]
async fn attributes_come_back_in_order_with_one_slot_each() {
    let db = seeded_backend().await;
    let mut event = pageview("ev_attrs", 100);
    event.event_type = "event".to_string();
    event.event_name = Some("signup".to_string());
    event.event_data = vec![
        EventDataField {
            data_key: "plan".to_string(),
            string_value: Some("pro".to_string()),
            number_value: None,
            date_value: None,
        },
        EventDataField {
            data_key: "seats".to_string(),
            string_value: None,
            number_value: Some(5.0),
            date_value: None,
        },
        EventDataField {
            data_key: "trial_ends".to_string(),
            string_value: None,
            number_value: None,
            date_value: Some(ts(999_000)),
        },
    ];
    db.insert_event("site_1", "sess_1", &event)
        .await
        .expect("insert");

    let events = db
        .get_session_activity("site_1", "sess_1", ts(0), ts(1000))
        .await
        .expect("query");
    assert_eq!(events.len(), 1);
    let data = &events[0].event_data;
    assert_eq!(data.len(), 3);

    assert_eq!(data[0].data_key, "plan");
    assert_eq!(data[0].string_value.as_deref(), Some("pro"));
    assert_eq!(data[0].number_value, None);
    assert_eq!(data[0].date_value, None);

    assert_eq!(data[1].data_key, "seats");
    assert_eq!(data[1].number_value, Some(5.0));
    assert_eq!(data[1].string_value, None);

    assert_eq!(data[2].data_key, "trial_ends");
    assert_eq!(data[2].date_value, Some(ts(999_000)));
    assert_eq!(data[2].string_value, None);
}

#[tokio::test]
async fn website_exists_reflects_seeding() {
    let db = seeded_backend().await;
    assert!(db.website_exists("site_1").await.expect("exists"));
    assert!(!db.website_exists("nope").await.expect("exists"));
}
