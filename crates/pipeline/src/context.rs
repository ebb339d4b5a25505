use axum::response::Response;
use warden_core::SessionState;

/// Per-request carrier threaded through `req.extensions` across the
/// middleware chain, then copied onto the response extensions at whichever
/// filter produces the final response (see `carry_context`).
#[derive(Clone, Default)]
pub struct RequestContext {
    /// The session fetched by `KeyExists` (or overwritten by
    /// `Oauth2KeyExists`). Mutated in place by the rate/quota middleware.
    pub session: Option<SessionState>,
    /// The auth key value (API key name or OAuth2 bearer token) that
    /// resolved `session`.
    pub auth_key: Option<String>,
    /// The effective version name resolved by `VersionCheck`.
    pub effective_version: Option<String>,
    /// Set by `VersionCheck` on `StatusOkAndIgnore`: every remaining auth
    /// filter passes the request straight through without consulting
    /// `session`/`auth_key` (neither is populated in this case).
    pub bypass_auth: bool,
}

/// Request extensions and response extensions are distinct maps, so a
/// context built up while filters run on the request is invisible to a
/// layer inspecting the response. Every exit point of the chain (an early
/// `GatewayError` response or the proxy terminator) carries its context
/// forward onto the response extensions via this so the outermost
/// analytics layer can read it back.
#[must_use]
pub fn carry_context(mut response: Response, ctx: Option<RequestContext>) -> Response {
    if let Some(ctx) = ctx {
        response.extensions_mut().insert(ctx);
    }
    response
}
