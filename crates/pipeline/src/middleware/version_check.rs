use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tower::{Layer, Service};
use warden_core::RequestStatus;
use warden_loader::{extract_version, is_request_valid};

use crate::context::{carry_context, RequestContext};
use crate::error::GatewayError;
use crate::state::PipelineState;
use crate::util::{query_param, strip_mount_prefix};

/// First filter in the chain (§4.5.1): resolves the effective version and
/// classifies the request path against that version's rules.
#[derive(Clone)]
pub struct VersionCheckLayer {
    state: PipelineState,
}

impl VersionCheckLayer {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for VersionCheckLayer {
    type Service = VersionCheckMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        VersionCheckMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct VersionCheckMiddleware<S> {
    inner: S,
    state: PipelineState,
}

impl<S> Service<Request<Body>> for VersionCheckMiddleware<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mount = state.spec.definition.proxy.listen_path.as_str();
            let path = strip_mount_prefix(mount, req.uri().path()).to_owned();

            let version_definition = &state.spec.definition.version_definition;
            let query = req.uri().query().map(str::to_owned);
            let extracted = extract_version(
                version_definition,
                |name| {
                    req.headers()
                        .get(name)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned)
                },
                |name| query.as_deref().and_then(|q| query_param(q, name)),
            );

            let validation = is_request_valid(&state.spec, extracted, &path, Utc::now());

            let mut ctx = RequestContext::default();
            ctx.effective_version = validation.effective_version.clone();

            if !validation.status.is_ok() {
                let response = GatewayError::PolicyViolation(validation.status).into_response();
                return Ok(carry_context(response, Some(ctx)));
            }

            ctx.bypass_auth = matches!(validation.status, RequestStatus::StatusOkAndIgnore);
            req.extensions_mut().insert(ctx);

            inner.call(req).await
        })
    }
}
