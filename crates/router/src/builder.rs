use async_trait::async_trait;

use crate::error::RouterError;
use crate::table::RoutingTable;

/// Knows how to (re)construct a full [`RoutingTable`] from scratch: reload
/// API definitions, compile each into an `ApiSpec`, build a per-API pipeline
/// chain, and re-bind the admin router. Implemented by the server binary,
/// which is the only place that holds the store/auth/analytics wiring the
/// definitions are compiled against — this crate only owns the table shape
/// and the swap, not how one gets built.
#[async_trait]
pub trait TableBuilder: Send + Sync {
    async fn build(&self) -> Result<RoutingTable, RouterError>;
}

/// Reload protocol (§4.7): build a new table, then atomically swap it in.
/// In-flight requests keep serving off the table they already loaded.
pub async fn reload(router: &crate::service::GatewayRouter, builder: &dyn TableBuilder) -> Result<(), RouterError> {
    let table = builder.build().await?;
    router.swap(table);
    Ok(())
}
