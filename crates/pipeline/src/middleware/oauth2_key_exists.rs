use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::context::{carry_context, RequestContext};
use crate::error::GatewayError;
use crate::state::PipelineState;

/// Third filter (§4.5.3): for OAuth2 APIs, re-resolves the session from a
/// bearer token on the standard `Authorization` header, overriding whatever
/// `KeyExists` deposited.
#[derive(Clone)]
pub struct Oauth2KeyExistsLayer {
    state: PipelineState,
}

impl Oauth2KeyExistsLayer {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for Oauth2KeyExistsLayer {
    type Service = Oauth2KeyExistsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Oauth2KeyExistsMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Oauth2KeyExistsMiddleware<S> {
    inner: S,
    state: PipelineState,
}

impl<S> Service<Request<Body>> for Oauth2KeyExistsMiddleware<S>
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
            let ctx = req.extensions().get::<RequestContext>().cloned().unwrap_or_default();
            if ctx.bypass_auth || !state.spec.definition.use_oauth2 {
                return inner.call(req).await;
            }

            let header = req
                .headers()
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());

            let Some(token) = parse_bearer(header) else {
                let response = GatewayError::BearerTokenMalformed.into_response();
                return Ok(carry_context(response, Some(ctx)));
            };

            let Some(session) = state.auth.is_key_authorised(&token).await else {
                let response = GatewayError::KeyNotAuthorised.into_response();
                return Ok(carry_context(response, Some(ctx)));
            };

            if let Some(ctx) = req.extensions_mut().get_mut::<RequestContext>() {
                ctx.session = Some(session);
                ctx.auth_key = Some(token);
            }

            inner.call(req).await
        })
    }
}

/// `"Bearer <token>"`, case-insensitive on the scheme, exactly two
/// whitespace-separated parts.
fn parse_bearer(header: Option<&str>) -> Option<String> {
    let header = header?;
    let mut parts = header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_case_insensitive_bearer_scheme() {
        assert_eq!(parse_bearer(Some("Bearer aabbcc")), Some("aabbcc".to_owned()));
        assert_eq!(parse_bearer(Some("bearer aabbcc")), Some("aabbcc".to_owned()));
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert_eq!(parse_bearer(Some("Basic aabbcc")), None);
    }

    #[test]
    fn rejects_missing_or_extra_parts() {
        assert_eq!(parse_bearer(None), None);
        assert_eq!(parse_bearer(Some("Bearer")), None);
        assert_eq!(parse_bearer(Some("Bearer a b")), None);
    }
}
