use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

use sessionscope_core::activity::{
    ActivityEvent, EventDataField, DATA_TYPE_DATE, DATA_TYPE_NUMBER, DATA_TYPE_STRING,
    MAX_ACTIVITY_EVENTS,
};

use crate::DuckDbBackend;

/// Timestamp text format used for every DuckDB parameter and VARCHAR cast.
/// One fixed format both ways avoids precision drift between what was
/// written and what a window comparison sees.
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn ts_param(ts: DateTime<Utc>) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .with_context(|| format!("unparseable timestamp '{raw}'"))
}

/// One row of the events ⋈ attributes join. Attribute columns are selected
/// by name; an event without attributes produces a single row with a NULL
/// `data_key`.
struct JoinedRow {
    event_id: String,
    visit_id: String,
    created_at: String,
    url_path: Option<String>,
    url_query: Option<String>,
    referrer_domain: Option<String>,
    event_type: String,
    event_name: Option<String>,
    data_key: Option<String>,
    data_type: Option<i64>,
    string_value: Option<String>,
    number_value: Option<f64>,
    date_value: Option<String>,
}

pub async fn get_session_activity_inner(
    db: &DuckDbBackend,
    website_id: &str,
    session_id: &str,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> Result<Vec<ActivityEvent>> {
    let conn = db.conn.lock().await;

    // The LIMIT binds to events, not join rows, so the cap is applied in a
    // CTE before attributes are attached.
    let sql = format!(
        r#"
        WITH recent_events AS (
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
              AND created_at BETWEEN CAST(?3 AS TIMESTAMP) AND CAST(?4 AS TIMESTAMP)
            ORDER BY created_at DESC, event_id
            LIMIT {}
        )
        SELECT
            we.event_id,
            we.visit_id,
            CAST(we.created_at AS VARCHAR) AS created_at,
            we.url_path,
            we.url_query,
            we.referrer_domain,
            we.event_type,
            we.event_name,
            ed.data_key,
            ed.data_type,
            ed.string_value,
            ed.number_value,
            CAST(ed.date_value AS VARCHAR) AS date_value
        FROM recent_events we
        LEFT JOIN event_data ed
               ON ed.event_id = we.event_id
              AND ed.website_id = ?1
        ORDER BY we.created_at DESC, we.event_id, ed.ordinal
        "#,
        MAX_ACTIVITY_EVENTS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        duckdb::params![
            website_id,
            session_id,
            ts_param(start_at),
            ts_param(end_at),
        ],
        |row| {
            Ok(JoinedRow {
                event_id: row.get(0)?,
                visit_id: row.get(1)?,
                created_at: row.get(2)?,
                url_path: row.get(3)?,
                url_query: row.get(4)?,
                referrer_domain: row.get(5)?,
                event_type: row.get(6)?,
                event_name: row.get(7)?,
                data_key: row.get(8)?,
                data_type: row.get(9)?,
                string_value: row.get(10)?,
                number_value: row.get(11)?,
                date_value: row.get(12)?,
            })
        },
    )?;

    // Join rows for one event are consecutive; fold them back into events
    // while preserving the newest-first order of the CTE.
    let mut events: Vec<ActivityEvent> = Vec::new();
    for row in rows {
        let row = row?;
        let is_new_event = events
            .last()
            .map(|e: &ActivityEvent| e.event_id != row.event_id)
            .unwrap_or(true);
        if is_new_event {
            events.push(ActivityEvent {
                event_id: row.event_id.clone(),
                visit_id: row.visit_id.clone(),
                created_at: parse_ts(&row.created_at)?,
                url_path: row.url_path.clone(),
                url_query: row.url_query.clone(),
                referrer_domain: row.referrer_domain.clone(),
                event_type: row.event_type.clone(),
                event_name: row.event_name.clone(),
                event_data: Vec::new(),
            });
        }
        if let Some(field) = data_field_from_row(&row)? {
            if let Some(event) = events.last_mut() {
                event.event_data.push(field);
            }
        }
    }

    Ok(events)
}

/// Build an attribute from the join row's named columns. `None` when the
/// LEFT JOIN found no attributes for the event. Only the value slot the
/// stored `data_type` declares is populated.
fn data_field_from_row(row: &JoinedRow) -> Result<Option<EventDataField>> {
    let Some(data_key) = row.data_key.clone() else {
        return Ok(None);
    };
    let data_type = row.data_type.unwrap_or(DATA_TYPE_STRING);
    let date_value = match (data_type, row.date_value.as_deref()) {
        (DATA_TYPE_DATE, Some(raw)) => Some(parse_ts(raw)?),
        _ => None,
    };
    Ok(Some(EventDataField {
        data_key,
        string_value: (data_type == DATA_TYPE_STRING)
            .then(|| row.string_value.clone())
            .flatten(),
        number_value: (data_type == DATA_TYPE_NUMBER)
            .then_some(row.number_value)
            .flatten(),
        date_value,
    }))
}
