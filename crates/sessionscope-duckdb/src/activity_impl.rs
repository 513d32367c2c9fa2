use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sessionscope_core::activity::{ActivityBackend, ActivityEvent};

use crate::DuckDbBackend;

#[async_trait]
impl ActivityBackend for DuckDbBackend {
    async fn get_session_activity(
        &self,
        website_id: &str,
        session_id: &str,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ActivityEvent>> {
        crate::queries::activity::get_session_activity_inner(
            self, website_id, session_id, start_at, end_at,
        )
        .await
    }

    async fn website_exists(&self, website_id: &str) -> anyhow::Result<bool> {
        DuckDbBackend::website_exists(self, website_id).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        DuckDbBackend::ping(self).await
    }
}
