//! Activity backend abstraction.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Hard cap on the number of events one activity query returns.
pub const MAX_ACTIVITY_EVENTS: usize = 500;

/// Event name whose attributes carry raw identity data. The normalizer
/// rewrites it to a redacted label before anything leaves the service.
pub const PROFILE_IDENTIFIED_EVENT: &str = "profile_identified";

/// Declared attribute value types, matching the `data_type` column in both
/// stores. Exactly one value slot is populated per attribute.
pub const DATA_TYPE_STRING: i64 = 1;
pub const DATA_TYPE_NUMBER: i64 = 2;
pub const DATA_TYPE_DATE: i64 = 4;

/// One key/value attribute attached to an event. The shape is identical
/// regardless of which store produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDataField {
    pub data_key: String,
    pub string_value: Option<String>,
    pub number_value: Option<f64>,
    pub date_value: Option<DateTime<Utc>>,
}

impl EventDataField {
    /// The stored `data_type` discriminant for this attribute, derived from
    /// which value slot is populated.
    pub fn data_type(&self) -> i64 {
        if self.string_value.is_some() {
            DATA_TYPE_STRING
        } else if self.number_value.is_some() {
            DATA_TYPE_NUMBER
        } else if self.date_value.is_some() {
            DATA_TYPE_DATE
        } else {
            DATA_TYPE_STRING
        }
    }
}

/// A raw event as returned by a backend, attribute list attached.
/// Lives only for the duration of one request.
#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub event_id: String,
    pub visit_id: String,
    pub created_at: DateTime<Utc>,
    pub url_path: Option<String>,
    pub url_query: Option<String>,
    pub referrer_domain: Option<String>,
    pub event_type: String,
    pub event_name: Option<String>,
    pub event_data: Vec<EventDataField>,
}

/// The normalized, serializable record handed back to the HTTP layer.
///
/// Deliberately has no attribute-list field: attributes are consumed by the
/// normalizer and must never appear in a response. Field names serialize in
/// camelCase to match the public wire format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionActivityItem {
    pub created_at: DateTime<Utc>,
    pub url_path: Option<String>,
    pub url_query: Option<String>,
    pub referrer_domain: Option<String>,
    pub event_id: String,
    pub event_type: String,
    pub event_name: Option<String>,
    pub visit_id: String,
}

/// Read-path storage abstraction. One implementation is chosen at startup
/// from `Config.storage_mode` and injected as `Arc<dyn ActivityBackend>`;
/// exactly one backend executes per call, and its errors propagate
/// unrecovered — no retry, fallback, or cross-backend merge.
#[async_trait::async_trait]
pub trait ActivityBackend: Send + Sync + 'static {
    /// Events for `session_id` on `website_id` with `created_at` inside the
    /// closed window `[start_at, end_at]`, newest first, capped at
    /// [`MAX_ACTIVITY_EVENTS`]. An inverted window yields an empty result.
    async fn get_session_activity(
        &self,
        website_id: &str,
        session_id: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ActivityEvent>>;

    async fn website_exists(&self, website_id: &str) -> anyhow::Result<bool>;

    /// Lightweight liveness check for the `/health` endpoint.
    async fn ping(&self) -> anyhow::Result<()>;
}
