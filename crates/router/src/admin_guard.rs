use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower::{Layer, Service};

/// Header the "API owner" check (§4.7, §6) compares against the configured
/// shared secret. Every admin call must carry it.
pub const OWNER_HEADER: &str = "X-Warden-Authorisation";

fn forbidden() -> Response {
    let body = Json(serde_json::json!({ "status": "error", "message": "Forbidden" }));
    (StatusCode::FORBIDDEN, body).into_response()
}

/// Guards the admin surface: every request must carry `OWNER_HEADER` equal
/// to the configured shared secret, or it never reaches the admin handlers.
#[derive(Clone)]
pub struct AdminGuardLayer {
    secret: Arc<str>,
}

impl AdminGuardLayer {
    #[must_use]
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self { secret: secret.into() }
    }
}

impl<S> Layer<S> for AdminGuardLayer {
    type Service = AdminGuardMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdminGuardMiddleware { inner, secret: self.secret.clone() }
    }
}

#[derive(Clone)]
pub struct AdminGuardMiddleware<S> {
    inner: S,
    secret: Arc<str>,
}

impl<S> Service<Request<Body>> for AdminGuardMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let secret = self.secret.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let presented = req.headers().get(OWNER_HEADER).and_then(|value| value.to_str().ok());
            if presented != Some(secret.as_ref()) {
                return Ok(forbidden());
            }
            inner.call(req).await
        })
    }
}
