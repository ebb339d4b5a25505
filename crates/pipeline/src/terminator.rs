use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::Service;

use crate::context::{carry_context, RequestContext};
use crate::error::GatewayError;
use crate::state::PipelineState;
use crate::util::strip_mount_prefix;

/// Innermost service in the chain: the reverse-proxy terminator (§4.6). Runs
/// only once every filter ahead of it has let the request through (or
/// `VersionCheck` marked it as bypassing auth for an ignored path).
#[derive(Clone)]
pub struct ProxyService {
    state: PipelineState,
}

impl ProxyService {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl Service<Request<Body>> for ProxyService {
    type Response = Response;
    type Error = Infallible;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Infallible>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();

        Box::pin(async move {
            let ctx = req.extensions().get::<RequestContext>().cloned().unwrap_or_default();
            let response = forward(&state, req).await.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "upstream proxy request failed");
                GatewayError::Internal.into_response()
            });
            Ok(carry_context(response, Some(ctx)))
        })
    }
}

async fn forward(state: &PipelineState, req: Request<Body>) -> Result<Response, reqwest::Error> {
    let proxy = &state.spec.definition.proxy;
    let method = req.method().clone();
    let headers = req.headers().clone();
    let full_path = req.uri().path().to_owned();
    let query = req.uri().query().map(str::to_owned);

    let forwarded_path = if proxy.strip_listen_path {
        strip_mount_prefix(&proxy.listen_path, &full_path).to_owned()
    } else {
        full_path
    };

    let mut url = format!(
        "{}{}",
        proxy.target_url.trim_end_matches('/'),
        forwarded_path
    );
    if let Some(query) = query {
        url.push('?');
        url.push_str(&query);
    }

    let body_bytes = to_bytes(req.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    let upstream_request = state
        .http_client
        .request(method, url)
        .headers(strip_hop_by_hop(&headers))
        .body(body_bytes);

    let upstream_response = upstream_request.send().await?;

    let status = upstream_response.status();
    let response_headers = upstream_response.headers().clone();
    let body = upstream_response.bytes().await?;

    let mut response = Response::builder()
        .status(status)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response());
    *response.headers_mut() = response_headers;
    Ok(response)
}

/// Headers that describe the hop to the gateway itself, not the upstream
/// request, and must not be blindly forwarded.
const HOP_BY_HOP: &[&str] = &["connection", "keep-alive", "transfer-encoding", "host"];

fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        if !HOP_BY_HOP.contains(&name.as_str()) {
            out.insert(name.clone(), value.clone());
        }
    }
    out
}
