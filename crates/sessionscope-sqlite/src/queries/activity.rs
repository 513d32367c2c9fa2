use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use sessionscope_core::activity::{
    ActivityEvent, EventDataField, DATA_TYPE_DATE, DATA_TYPE_NUMBER, DATA_TYPE_STRING,
    MAX_ACTIVITY_EVENTS,
};

use crate::SqliteBackend;

/// Raw event row before timestamp conversion. Keeping millis as `i64` inside
/// the rusqlite row closure lets the out-of-range case surface as a proper
/// error instead of a panic.
struct EventRow {
    event_id: String,
    visit_id: String,
    created_at_ms: i64,
    url_path: Option<String>,
    url_query: Option<String>,
    referrer_domain: Option<String>,
    event_type: String,
    event_name: Option<String>,
}

struct DataRow {
    data_key: String,
    data_type: i64,
    string_value: Option<String>,
    number_value: Option<f64>,
    date_value_ms: Option<i64>,
}

pub async fn get_session_activity_inner(
    db: &SqliteBackend,
    website_id: &str,
    session_id: &str,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> Result<Vec<ActivityEvent>> {
    let conn = db.conn.lock().await;

    let events_sql = format!(
        r#"
        SELECT
            event_id,
            visit_id,
            created_at,
            url_path,
            url_query,
            referrer_domain,
            event_type,
            event_name
        FROM website_event
        WHERE website_id = ?1
          AND session_id = ?2
          AND created_at BETWEEN ?3 AND ?4
        ORDER BY created_at DESC, event_id
        LIMIT {}
        "#,
        MAX_ACTIVITY_EVENTS
    );

    let mut stmt = conn.prepare(&events_sql)?;
    let rows = stmt.query_map(
        rusqlite::params![
            website_id,
            session_id,
            start_at.timestamp_millis(),
            end_at.timestamp_millis(),
        ],
        |row| {
            Ok(EventRow {
                event_id: row.get(0)?,
                visit_id: row.get(1)?,
                created_at_ms: row.get(2)?,
                url_path: row.get(3)?,
                url_query: row.get(4)?,
                referrer_domain: row.get(5)?,
                event_type: row.get(6)?,
                event_name: row.get(7)?,
            })
        },
    )?;

    let mut event_rows = Vec::new();
    for row in rows {
        event_rows.push(row?);
    }

    // One reused prepared statement, one lookup per event. The result set is
    // capped at MAX_ACTIVITY_EVENTS and the connection is in-process, so the
    // per-event round trip is a non-issue.
    let mut data_stmt = conn.prepare(
        r#"
        SELECT data_key, data_type, string_value, number_value, date_value
        FROM event_data
        WHERE website_id = ?1 AND event_id = ?2
        ORDER BY ordinal ASC
        "#,
    )?;

    let mut events = Vec::with_capacity(event_rows.len());
    for row in event_rows {
        let data_rows = data_stmt.query_map(rusqlite::params![website_id, row.event_id], |r| {
            Ok(DataRow {
                data_key: r.get(0)?,
                data_type: r.get(1)?,
                string_value: r.get(2)?,
                number_value: r.get(3)?,
                date_value_ms: r.get(4)?,
            })
        })?;

        let mut event_data = Vec::new();
        for data_row in data_rows {
            event_data.push(data_field_from_row(data_row?)?);
        }

        events.push(ActivityEvent {
            event_id: row.event_id,
            visit_id: row.visit_id,
            created_at: millis_to_utc(row.created_at_ms)?,
            url_path: row.url_path,
            url_query: row.url_query,
            referrer_domain: row.referrer_domain,
            event_type: row.event_type,
            event_name: row.event_name,
            event_data,
        });
    }

    Ok(events)
}

/// Populate exactly the value slot the stored `data_type` declares; the
/// other two stay `None` even if the row carries stray values.
fn data_field_from_row(row: DataRow) -> Result<EventDataField> {
    let date_value = match (row.data_type, row.date_value_ms) {
        (DATA_TYPE_DATE, Some(ms)) => Some(millis_to_utc(ms)?),
        _ => None,
    };
    Ok(EventDataField {
        data_key: row.data_key,
        string_value: (row.data_type == DATA_TYPE_STRING)
            .then_some(row.string_value)
            .flatten(),
        number_value: (row.data_type == DATA_TYPE_NUMBER)
            .then_some(row.number_value)
            .flatten(),
        date_value,
    })
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("timestamp {ms} out of range"))
}
