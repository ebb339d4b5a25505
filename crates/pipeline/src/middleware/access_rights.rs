use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::context::{carry_context, RequestContext};
use crate::error::GatewayError;
use crate::state::PipelineState;

/// Fifth filter (§4.5.5): an empty `AccessRights` map grants the key access
/// to every API; a non-empty map requires an entry for this API whose
/// allowed-versions list names the effective version.
#[derive(Clone)]
pub struct AccessRightsLayer {
    state: PipelineState,
}

impl AccessRightsLayer {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AccessRightsLayer {
    type Service = AccessRightsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessRightsMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AccessRightsMiddleware<S> {
    inner: S,
    state: PipelineState,
}

impl<S> Service<Request<Body>> for AccessRightsMiddleware<S>
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
                && !session.access_rights.is_empty()
            {
                let api_id = &state.spec.definition.api_id;
                let allowed = session.access_rights.get(api_id).is_some_and(|entry| {
                    ctx.effective_version
                        .as_deref()
                        .is_some_and(|version| entry.allowed_versions.iter().any(|v| v == version))
                });
                if !allowed {
                    let response = GatewayError::AccessDisallowed.into_response();
                    return Ok(carry_context(response, Some(ctx)));
                }
            }

            inner.call(req).await
        })
    }
}
