use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use warden_auth::AuthManager;
use warden_core::ApiSpec;
use warden_loader::{DefinitionSource, DirectorySource};
use warden_pipeline::PipelineState;
use warden_router::{build_table, AdminGuardLayer, GatewayRouter, RouterError, RoutingTable, TableBuilder};

use crate::admin::{self, AdminState};

/// Everything needed to rebuild the routing table from scratch on every
/// reload (§4.7): the definitions directory is re-read and re-compiled,
/// but the store/auth/analytics connections are stable across reloads and
/// simply get reused. `Clone` so each reload's admin router can be handed
/// its own `Arc<dyn TableBuilder>` referring back to an equivalent builder
/// without a circular `Arc<Self>` at construction time.
#[derive(Clone)]
pub struct WardenTableBuilder {
    pub source: DirectorySource,
    pub auth: Arc<AuthManager>,
    pub analytics: Arc<dyn warden_analytics::AnalyticsSink>,
    pub http_client: reqwest::Client,
    pub per_key_locking: bool,
    pub admin_secret: Arc<str>,
    /// Filled in by `main.rs` once the `GatewayRouter` exists, so the
    /// `/warden/reload` handler can trigger a swap on itself.
    pub router_handle: Arc<OnceLock<GatewayRouter>>,
}

#[async_trait]
impl TableBuilder for WardenTableBuilder {
    async fn build(&self) -> Result<RoutingTable, RouterError> {
        let definitions = self.source.load()?;

        let mut states = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if !definition.active {
                continue;
            }
            let api_id = definition.api_id.clone();
            match ApiSpec::compile(definition) {
                Ok(spec) => {
                    let state = PipelineState::new(
                        Arc::new(spec),
                        self.auth.clone(),
                        self.analytics.clone(),
                        self.per_key_locking,
                        self.http_client.clone(),
                    );
                    states.push(state);
                }
                Err(err) => {
                    tracing::warn!(error = %err, api_id = %api_id, "skipping malformed API definition");
                }
            }
        }
        let mounted = states.len();

        let admin_state =
            AdminState { auth: self.auth.clone(), table_builder: Arc::new(self.clone()), router_handle: self.router_handle.clone() };
        let admin = admin::router(admin_state).layer(AdminGuardLayer::new(self.admin_secret.clone()));

        tracing::info!(mounted_apis = mounted, "routing table built");
        Ok(build_table(states, admin))
    }
}
