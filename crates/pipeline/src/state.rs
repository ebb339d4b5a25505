use std::sync::Arc;

use warden_analytics::AnalyticsSink;
use warden_auth::AuthManager;
use warden_core::ApiSpec;
use warden_ratelimit::KeyLocks;

/// Everything one API's middleware chain needs, shared behind `Arc` across
/// requests and swapped as a unit on reload (see `warden-router`).
#[derive(Clone)]
pub struct PipelineState {
    pub spec: Arc<ApiSpec>,
    pub auth: Arc<AuthManager>,
    pub key_locks: Arc<KeyLocks>,
    pub per_key_locking: bool,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub http_client: reqwest::Client,
}

impl PipelineState {
    #[must_use]
    pub fn new(
        spec: Arc<ApiSpec>,
        auth: Arc<AuthManager>,
        analytics: Arc<dyn AnalyticsSink>,
        per_key_locking: bool,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            spec,
            auth,
            key_locks: Arc::new(KeyLocks::new()),
            per_key_locking,
            analytics,
            http_client,
        }
    }
}
