use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::context::{carry_context, RequestContext};
use crate::error::GatewayError;
use crate::state::PipelineState;

/// Fourth filter (§4.5.4): rejects a resolved session that has expired.
#[derive(Clone)]
pub struct KeyExpiredLayer {
    state: PipelineState,
}

impl KeyExpiredLayer {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for KeyExpiredLayer {
    type Service = KeyExpiredMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        KeyExpiredMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct KeyExpiredMiddleware<S> {
    inner: S,
    state: PipelineState,
}

impl<S> Service<Request<Body>> for KeyExpiredMiddleware<S>
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
        let state = self.state.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ctx = req.extensions().get::<RequestContext>().cloned().unwrap_or_default();
            if ctx.bypass_auth {
                return inner.call(req).await;
            }
            if let Some(session) = &ctx.session
                && state.auth.is_key_expired(session)
            {
                let response = GatewayError::KeyExpired.into_response();
                return Ok(carry_context(response, Some(ctx)));
            }

            inner.call(req).await
        })
    }
}
