use std::sync::Arc;

use anyhow::Result;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use sessionscope_core::activity::{ActivityEvent, EventDataField};

use crate::queries::activity::ts_param;
use crate::schema::init_sql;

const DEFAULT_MEMORY_LIMIT: &str = "1GB";

/// The columnar (analytical) backend, backed by an embedded DuckDB file.
///
/// DuckDB is single-writer: concurrent reads are fine, but the write path
/// (fixtures/seeding only in this service) must be serialised. The
/// connection is wrapped in `Arc<Mutex<_>>` so the struct can be cheaply
/// cloned and shared across Axum handlers.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// Runs the schema init SQL on the connection so all tables and indexes
    /// are created if they do not already exist.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(DEFAULT_MEMORY_LIMIT))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, DEFAULT_MEMORY_LIMIT
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for unit tests only — data is discarded when the struct is
    /// dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql(DEFAULT_MEMORY_LIMIT))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Return `true` if a website with the given id exists.
    pub async fn website_exists(&self, website_id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM website WHERE website_id = ?1")?;
        let count: i64 = stmt.query_row(duckdb::params![website_id], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Insert or replace a website row.
    ///
    /// Intended for test fixtures and first-startup seeding. Safe to call
    /// repeatedly with the same `website_id`.
    pub async fn seed_website(&self, website_id: &str, name: &str, domain: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO website (website_id, name, domain)
               VALUES (?1, ?2, ?3)
               ON CONFLICT (website_id) DO UPDATE SET name = EXCLUDED.name,
                                                      domain = EXCLUDED.domain"#,
            duckdb::params![website_id, name, domain],
        )?;
        Ok(())
    }

    /// Insert one event and its attribute rows in a single transaction.
    ///
    /// Fixture/seed path only — the read service itself never writes events.
    /// Attribute rows record their position in `event.event_data` as
    /// `ordinal` so reads reproduce the original attribute order.
    pub async fn insert_event(
        &self,
        website_id: &str,
        session_id: &str,
        event: &ActivityEvent,
    ) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        tx.execute(
            r#"INSERT INTO website_event (
                event_id, website_id, session_id, visit_id,
                event_type, event_name, url_path, url_query, referrer_domain,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, CAST(?10 AS TIMESTAMP))"#,
            duckdb::params![
                event.event_id,
                website_id,
                session_id,
                event.visit_id,
                event.event_type,
                event.event_name,
                event.url_path,
                event.url_query,
                event.referrer_domain,
                ts_param(event.created_at),
            ],
        )?;

        for (ordinal, field) in event.event_data.iter().enumerate() {
            insert_event_data(&tx, website_id, &event.event_id, ordinal as i64, field)?;
        }

        tx.commit()?;
        Ok(())
    }
}

fn insert_event_data(
    tx: &duckdb::Transaction<'_>,
    website_id: &str,
    event_id: &str,
    ordinal: i64,
    field: &EventDataField,
) -> Result<()> {
    tx.execute(
        r#"INSERT INTO event_data (
            website_id, event_id, ordinal, data_key, data_type,
            string_value, number_value, date_value
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, CAST(?8 AS TIMESTAMP))"#,
        duckdb::params![
            website_id,
            event_id,
            ordinal,
            field.data_key,
            field.data_type(),
            field.string_value,
            field.number_value,
            field.date_value.map(ts_param),
        ],
    )?;
    Ok(())
}
