use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tower::util::BoxCloneSyncService;
use tower::ServiceBuilder;

use crate::middleware::{
    AccessRightsLayer, AnalyticsLayer, KeyExistsLayer, KeyExpiredLayer, Oauth2KeyExistsLayer,
    RateLimitAndQuotaLayer, VersionCheckLayer,
};
use crate::state::PipelineState;
use crate::terminator::ProxyService;

/// A boxed, cloneable handle to one API's fully assembled chain, suitable
/// for mounting at its `listen_path` by the router crate.
pub type BoxedChain = BoxCloneSyncService<Request<Body>, Response, std::convert::Infallible>;

/// Compose the full middleware chain for one API (§4.5/§4.6), in the order
/// the spec mandates. `.layer()` wraps outermost-first, so the six concrete
/// middlewares are added in their request-flow order: `VersionCheck` goes on
/// first (outermost, seeing the request first) and `RateLimitAndQuota` goes
/// on last (innermost, right against the terminator). `AnalyticsLayer` wraps
/// everything so it observes the final response regardless of which filter
/// produced it.
#[must_use]
pub fn build_chain(state: PipelineState) -> BoxedChain {
    let service = ServiceBuilder::new()
        .layer(AnalyticsLayer::new(state.clone()))
        .layer(VersionCheckLayer::new(state.clone()))
        .layer(KeyExistsLayer::new(state.clone()))
        .layer(Oauth2KeyExistsLayer::new(state.clone()))
        .layer(KeyExpiredLayer::new(state.clone()))
        .layer(AccessRightsLayer::new(state.clone()))
        .layer(RateLimitAndQuotaLayer::new(state.clone()))
        .service(ProxyService::new(state));

    BoxCloneSyncService::new(service)
}

/// Wrap a [`BoxedChain`] as a standalone [`Router`] bound at every path
/// under its mount point. The router crate nests this at `proxy.listen_path`.
#[must_use]
pub fn chain_router(chain: BoxedChain) -> Router {
    Router::new().fallback_service(chain)
}
