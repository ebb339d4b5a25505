use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use tower::Service;

use crate::table::{RoutingTable, ADMIN_PREFIX};

fn not_found() -> Response {
    Response::builder().status(StatusCode::NOT_FOUND).body(Body::empty()).expect("fixed response always builds")
}

/// The single long-lived entry point for every inbound connection. Holds
/// the live [`RoutingTable`] behind an [`ArcSwap`] so a reload (§4.7) is a
/// single atomic pointer replace: in-flight requests keep the `Arc` they
/// already loaded, new requests see the new table.
#[derive(Clone)]
pub struct GatewayRouter {
    table: Arc<ArcSwap<RoutingTable>>,
}

impl GatewayRouter {
    #[must_use]
    pub fn new(table: RoutingTable) -> Self {
        Self { table: Arc::new(ArcSwap::from_pointee(table)) }
    }

    /// Atomically replace the live table. Called by the reload protocol
    /// (admin call, signal, or the definitions-directory watcher).
    pub fn swap(&self, table: RoutingTable) {
        self.table.store(Arc::new(table));
    }
}

impl Service<Request<Body>> for GatewayRouter {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let table = self.table.load_full();
        let path = req.uri().path().to_owned();

        if path.starts_with(ADMIN_PREFIX) {
            let mut admin = table.admin().clone();
            return Box::pin(async move { admin.call(req).await });
        }

        let Some(chain) = table.match_mount(&path) else {
            return Box::pin(async move { Ok(not_found()) });
        };
        let mut chain = chain.clone();
        Box::pin(async move { chain.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible as Never;

    use axum::body::Body;
    use axum::http::{Request, Response as HttpResponse, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::util::BoxCloneSyncService;
    use tower::ServiceExt;

    use super::*;

    fn stub_chain() -> crate::table::RoutingTable {
        let service = tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, Never>(HttpResponse::builder().status(StatusCode::OK).body(Body::from("proxied")).unwrap())
        });
        let chain = BoxCloneSyncService::new(service);
        let admin = Router::new().route("/warden/health", get(|| async { "ok" }));
        RoutingTable::new(vec![("/api".into(), chain)], admin)
    }

    #[tokio::test]
    async fn routes_to_matching_mount() {
        let router = GatewayRouter::new(stub_chain());
        let response = router.oneshot(Request::builder().uri("/api/x").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn falls_through_to_admin_router() {
        let router = GatewayRouter::new(stub_chain());
        let response = router.oneshot(Request::builder().uri("/warden/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unmatched_path_is_404() {
        let router = GatewayRouter::new(stub_chain());
        let response = router.oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn swap_replaces_table_atomically() {
        let router = GatewayRouter::new(stub_chain());
        router.swap(RoutingTable::new(vec![], Router::new()));
        let response = router.oneshot(Request::builder().uri("/api/x").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
