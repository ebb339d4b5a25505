use std::convert::Infallible;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::context::{carry_context, RequestContext};
use crate::error::GatewayError;
use crate::state::PipelineState;

/// Second filter (§4.5.2): reads the API's configured auth header and looks
/// up the session it names. Passes straight through for OAuth2 APIs, where
/// `Oauth2KeyExists` performs the key check instead.
#[derive(Clone)]
pub struct KeyExistsLayer {
    state: PipelineState,
}

impl KeyExistsLayer {
    #[must_use]
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for KeyExistsLayer {
    type Service = KeyExistsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        KeyExistsMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct KeyExistsMiddleware<S> {
    inner: S,
    state: PipelineState,
}

impl<S> Service<Request<Body>> for KeyExistsMiddleware<S>
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
            if ctx.bypass_auth || state.spec.definition.use_oauth2 {
                return inner.call(req).await;
            }

            let header_name = state.spec.definition.auth_header_name.as_str();
            let Some(key) = req
                .headers()
                .get(header_name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
            else {
                let response = GatewayError::AuthorisationFieldMissing.into_response();
                return Ok(carry_context(response, Some(ctx)));
            };

            let Some(session) = state.auth.is_key_authorised(&key).await else {
                let response = GatewayError::KeyNotAuthorised.into_response();
                return Ok(carry_context(response, Some(ctx)));
            };

            if let Some(ctx) = req.extensions_mut().get_mut::<RequestContext>() {
                ctx.session = Some(session);
                ctx.auth_key = Some(key);
            }

            inner.call(req).await
        })
    }
}
