use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced outside the request path: config loading, store/socket
/// setup, and routing-table construction. Distinct from `GatewayError`
/// (per-request, in `warden-pipeline`) per §7's "one enum per seam" design.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("routing table error: {0}")]
    Router(#[from] warden_router::RouterError),
    #[error("store error: {0}")]
    Store(#[from] warden_state::StoreError),
    #[error(transparent)]
    Auth(#[from] warden_auth::AuthError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!(error = %message, "unrecoverable server error");
        let body = serde_json::json!({ "status": "error", "message": message });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
