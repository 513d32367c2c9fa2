use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use sessionscope_core::activity::ActivityBackend;
use sessionscope_core::config::{AuthMode, Config, StorageMode};
use sessionscope_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sessionscope=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Ensure the data directory exists before opening either store.
    std::fs::create_dir_all(&cfg.data_dir)?;

    // Exactly one backend is opened per process; the storage mode is fixed
    // for the lifetime of the run. Seeding a default website uses ON CONFLICT
    // upserts, so it is safe on every startup.
    let activity: Arc<dyn ActivityBackend> = match cfg.storage_mode {
        StorageMode::Relational => {
            let path = format!("{}/sessionscope.sqlite", cfg.data_dir);
            let db = sessionscope_sqlite::SqliteBackend::open(&path)?;
            if let Err(e) = db.seed_website("site_default", "Default", "localhost").await {
                tracing::warn!(error = %e, "Failed to seed default website");
            }
            Arc::new(db)
        }
        StorageMode::Columnar => {
            let path = format!("{}/sessionscope.duckdb", cfg.data_dir);
            let db = sessionscope_duckdb::DuckDbBackend::open(&path)?;
            if let Err(e) = db.seed_website("site_default", "Default", "localhost").await {
                tracing::warn!(error = %e, "Failed to seed default website");
            }
            Arc::new(db)
        }
    };

    match &cfg.auth_mode {
        AuthMode::Token(_) => info!("Bearer token auth enabled"),
        AuthMode::None => info!("Auth disabled (SESSIONSCOPE_AUTH=none) — all routes open"),
    }

    let addr = format!("0.0.0.0:{}", cfg.port);
    let state = Arc::new(AppState::new(activity, cfg.clone()));
    let app = sessionscope_server::app::build_app(Arc::clone(&state));

    info!(
        port = cfg.port,
        storage = ?cfg.storage_mode,
        "sessionscope listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
