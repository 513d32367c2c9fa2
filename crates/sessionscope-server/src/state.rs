use std::sync::Arc;

use tracing::error;

use sessionscope_core::activity::ActivityBackend;
use sessionscope_core::config::Config;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// `activity` is the one backend chosen at startup from
/// `Config.storage_mode`. It never changes for the lifetime of the process,
/// which is what makes concurrent requests independent of each other.
pub struct AppState {
    pub activity: Arc<dyn ActivityBackend>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(activity: Arc<dyn ActivityBackend>, config: Config) -> Self {
        Self {
            activity,
            config: Arc::new(config),
        }
    }

    /// Return `true` if the authenticated principal may view `website_id`.
    ///
    /// Authentication itself happens in the auth middleware; every
    /// authenticated principal of this single-team deployment may view any
    /// website that exists, so visibility reduces to an existence check.
    /// A failed lookup is logged and treated as "not visible".
    pub async fn can_view_website(&self, website_id: &str) -> bool {
        match self.activity.website_exists(website_id).await {
            Ok(found) => found,
            Err(e) => {
                error!(website_id, error = %e, "website_exists lookup failed");
                false
            }
        }
    }
}
