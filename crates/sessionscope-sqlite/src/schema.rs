/// SQLite initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// Timestamps are stored as INTEGER epoch milliseconds (UTC). The HTTP
/// layer already speaks epoch millis, so window comparisons stay purely
/// numeric with no text-format pitfalls.
pub const INIT_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ===========================================
-- WEBSITES
-- ===========================================
CREATE TABLE IF NOT EXISTS website (
    website_id      TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    domain          TEXT,
    created_at      INTEGER NOT NULL
);

-- ===========================================
-- EVENTS (one row per recorded interaction)
-- ===========================================
CREATE TABLE IF NOT EXISTS website_event (
    event_id        TEXT PRIMARY KEY,
    website_id      TEXT NOT NULL,
    session_id      TEXT NOT NULL,
    visit_id        TEXT NOT NULL,
    event_type      TEXT NOT NULL,          -- 'pageview' | 'event'
    event_name      TEXT,                   -- NULL for pageviews
    url_path        TEXT,
    url_query       TEXT,
    referrer_domain TEXT,
    created_at      INTEGER NOT NULL        -- epoch millis UTC
);
CREATE INDEX IF NOT EXISTS idx_website_event_session
    ON website_event (website_id, session_id, created_at);

-- ===========================================
-- EVENT ATTRIBUTES (one row per key/value pair)
-- ===========================================
-- data_type selects which single value column is populated:
--   1 = string_value, 2 = number_value, 4 = date_value
-- ordinal preserves the attribute order within one event.
CREATE TABLE IF NOT EXISTS event_data (
    website_id      TEXT NOT NULL,
    event_id        TEXT NOT NULL,
    ordinal         INTEGER NOT NULL,
    data_key        TEXT NOT NULL,
    data_type       INTEGER NOT NULL,
    string_value    TEXT,
    number_value    REAL,
    date_value      INTEGER                 -- epoch millis UTC
);
CREATE INDEX IF NOT EXISTS idx_event_data_event
    ON event_data (website_id, event_id, ordinal);
"#;
