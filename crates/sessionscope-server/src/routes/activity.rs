use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use sessionscope_core::normalize::normalize_activity;

use crate::{error::AppError, state::AppState};

/// Query parameters for the activity endpoint. Both are integer epoch
/// milliseconds; non-numeric values are rejected by the extractor before
/// the handler runs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    pub start_at: i64,
    pub end_at: i64,
}

/// `GET /api/websites/{website_id}/sessions/{session_id}/activity`
///
/// Returns the normalized activity for one visitor session, newest first,
/// capped at 500 events. The response carries no raw attribute lists;
/// profile-identified events arrive with their redacted display name.
pub async fn get_session_activity(
    State(state): State<Arc<AppState>>,
    Path((website_id, session_id)): Path<(String, String)>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, AppError> {
    if !state.can_view_website(&website_id).await {
        return Err(AppError::NotFound("Website not found".to_string()));
    }

    let start_at = parse_epoch_millis(query.start_at, "startAt")?;
    let end_at = parse_epoch_millis(query.end_at, "endAt")?;

    // An inverted window is a valid request that matches nothing; the
    // backend returns an empty sequence for it.
    let raw = state
        .activity
        .get_session_activity(&website_id, &session_id, start_at, end_at)
        .await
        .map_err(AppError::Internal)?;

    let data = normalize_activity(raw);
    Ok(Json(json!({ "data": data })))
}

fn parse_epoch_millis(ms: i64, param: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AppError::BadRequest(format!("{param} is out of range")))
}
