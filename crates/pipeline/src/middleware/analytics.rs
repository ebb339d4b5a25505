use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use chrono::Utc;
use tower::{Layer, Service};
use warden_core::AnalyticsRecord;

use crate::context::RequestContext;
use crate::state::PipelineState;

/// Outermost layer (§4.6): wraps the whole chain so every request, whether
/// it succeeds at the terminator or is rejected by an earlier filter, emits
/// exactly one analytics record carrying the response status that was
/// actually sent.
#[derive(Clone)]
pub struct AnalyticsLayer {
    state: PipelineState,
}

impl AnalyticsLayer {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AnalyticsLayer {
    type Service = AnalyticsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AnalyticsMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsMiddleware<S> {
    inner: S,
    state: PipelineState,
}

impl<S> Service<Request<Body>> for AnalyticsMiddleware<S>
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

        let method = req.method().to_string();
        let path = req.uri().path().to_owned();
        let content_length = req
            .headers()
            .get(axum::http::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0);
        let user_agent = req
            .headers()
            .get(axum::http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        Box::pin(async move {
            let response = inner.call(req).await?;

            let ctx = response
                .extensions()
                .get::<RequestContext>()
                .cloned()
                .unwrap_or_default();
            let api_key = ctx.auth_key.unwrap_or_default();
            let record = AnalyticsRecord::new(
                method,
                path,
                content_length,
                user_agent,
                response.status().as_u16(),
                api_key,
                Utc::now(),
                ctx.effective_version.as_deref(),
                state.spec.definition.name.clone(),
                state.spec.definition.api_id.clone(),
                state.spec.definition.org_id.clone(),
            );

            let sink = state.analytics.clone();
            tokio::spawn(async move {
                sink.emit(record).await;
            });

            Ok(response)
        })
    }
}
