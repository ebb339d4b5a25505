use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tower::{Layer, Service};
use warden_ratelimit::{check_and_consume, Decision, DenyReason};

use crate::context::{carry_context, RequestContext};
use crate::error::GatewayError;
use crate::state::PipelineState;

/// Sixth and last filter (§4.5.6): the token-bucket + rolling-quota engine.
/// The mutated session is written back to the store regardless of the
/// decision, so `Allowance`/quota state persists across requests even on a
/// denial.
#[derive(Clone)]
pub struct RateLimitAndQuotaLayer {
    state: PipelineState,
}

impl RateLimitAndQuotaLayer {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for RateLimitAndQuotaLayer {
    type Service = RateLimitAndQuotaMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitAndQuotaMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitAndQuotaMiddleware<S> {
    inner: S,
    state: PipelineState,
}

impl<S> Service<Request<Body>> for RateLimitAndQuotaMiddleware<S>
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

            let (Some(mut session), Some(auth_key)) = (ctx.session.clone(), ctx.auth_key.clone())
            else {
                // KeyExists/Oauth2KeyExists guarantee both are set once
                // bypass_auth is false; falling through here would only
                // mask a bug upstream.
                let response = GatewayError::Internal.into_response();
                return Ok(carry_context(response, Some(ctx)));
            };

            let guard = if state.per_key_locking {
                Some(state.key_locks.lock_for(&auth_key).lock_owned().await)
            } else {
                None
            };

            let decision = check_and_consume(&mut session, Utc::now().timestamp());

            if let Err(err) = state.auth.update_session(&auth_key, &session).await {
                tracing::warn!(error = %err, key = %auth_key, "failed to persist rate/quota state");
            }
            drop(guard);

            match decision {
                Decision::Allow => inner.call(req).await,
                Decision::Deny(DenyReason::Rate) => {
                    Ok(carry_context(GatewayError::RateLimitExceeded.into_response(), Some(ctx)))
                }
                Decision::Deny(DenyReason::Quota) => {
                    Ok(carry_context(GatewayError::QuotaLimitExceeded.into_response(), Some(ctx)))
                }
            }
        })
    }
}
