//! Post-retrieval normalization and identity masking.

use crate::activity::{ActivityEvent, EventDataField, SessionActivityItem, PROFILE_IDENTIFIED_EVENT};

const MASKED_NAME_PREFIX: &str = "profile_identify";
const PHONE_MASK: &str = "****";
const PHONE_VISIBLE_CHARS: usize = 4;

/// Convert raw backend events into their public shape, same length and
/// order. Builds fresh records rather than mutating the input, so there is
/// never a partially-rewritten event in flight.
pub fn normalize_activity(events: Vec<ActivityEvent>) -> Vec<SessionActivityItem> {
    events.into_iter().map(normalize_event).collect()
}

fn normalize_event(event: ActivityEvent) -> SessionActivityItem {
    let event_name = if event.event_name.as_deref() == Some(PROFILE_IDENTIFIED_EVENT) {
        Some(masked_profile_name(&event.event_data))
    } else {
        event.event_name
    };

    SessionActivityItem {
        created_at: event.created_at,
        url_path: event.url_path,
        url_query: event.url_query,
        referrer_domain: event.referrer_domain,
        event_id: event.event_id,
        event_type: event.event_type,
        event_name,
        visit_id: event.visit_id,
    }
}

/// Synthesize the redacted display label for a profile-identified event.
///
/// Missing attributes degrade to empty segments, never an error. When a key
/// appears more than once, the first occurrence wins.
fn masked_profile_name(fields: &[EventDataField]) -> String {
    let case_id = first_string(fields, "caseId").unwrap_or_default();
    let masked_phone = first_string(fields, "phone_number")
        .filter(|p| !p.is_empty())
        .map(|p| mask_phone(&p))
        .unwrap_or_default();
    format!("{MASKED_NAME_PREFIX}_{case_id}_{masked_phone}")
}

fn first_string(fields: &[EventDataField], key: &str) -> Option<String> {
    fields
        .iter()
        .find(|f| f.data_key == key)
        .and_then(|f| f.string_value.clone())
}

/// Keep the last four characters, replace everything before them with a
/// fixed-width mask. Counts characters, not bytes.
fn mask_phone(phone: &str) -> String {
    let skip = phone.chars().count().saturating_sub(PHONE_VISIBLE_CHARS);
    let tail: String = phone.chars().skip(skip).collect();
    format!("{PHONE_MASK}{tail}")
}
