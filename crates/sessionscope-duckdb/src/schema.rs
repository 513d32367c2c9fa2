/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// Always set an explicit memory limit — the DuckDB default (80% of system
/// RAM) is not acceptable for a server process. `SET threads = 2` keeps the
/// background pool small for single-connection embedded use.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- WEBSITES
-- ===========================================
CREATE TABLE IF NOT EXISTS website (
    website_id      VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    domain          VARCHAR,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ===========================================
-- EVENTS (one row per recorded interaction)
-- ===========================================
CREATE TABLE IF NOT EXISTS website_event (
    event_id        VARCHAR PRIMARY KEY,
    website_id      VARCHAR NOT NULL,
    session_id      VARCHAR NOT NULL,
    visit_id        VARCHAR NOT NULL,
    event_type      VARCHAR NOT NULL,       -- 'pageview' | 'event'
    event_name      VARCHAR,                -- NULL for pageviews
    url_path        VARCHAR,
    url_query       VARCHAR,
    referrer_domain VARCHAR,
    created_at      TIMESTAMP NOT NULL      -- UTC
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
    website_id      VARCHAR NOT NULL,
    event_id        VARCHAR NOT NULL,
    ordinal         INTEGER NOT NULL,
    data_key        VARCHAR NOT NULL,
    data_type       BIGINT NOT NULL,
    string_value    VARCHAR,
    number_value    DOUBLE,
    date_value      TIMESTAMP               -- UTC
);
CREATE INDEX IF NOT EXISTS idx_event_data_event
    ON event_data (website_id, event_id);
"#
    )
}
