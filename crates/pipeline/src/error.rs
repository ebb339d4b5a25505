use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use warden_core::RequestStatus;

const GENERATOR_HEADER: &str = "X-Generator";
const GENERATOR_VALUE: &str = "warden-gateway";

/// The error taxonomy of §7: each variant carries the exact message the
/// client sees and maps to a fixed HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Authorisation field missing")]
    AuthorisationFieldMissing,
    #[error("Bearer token malformed")]
    BearerTokenMalformed,
    #[error("Key not authorised")]
    KeyNotAuthorised,
    #[error("Key has expired")]
    KeyExpired,
    #[error("Access to this API has been disallowed")]
    AccessDisallowed,
    #[error("Key rate limit exceeded")]
    RateLimitExceeded,
    #[error("Key quota limit exceeded")]
    QuotaLimitExceeded,
    #[error("{}", .0.message())]
    PolicyViolation(RequestStatus),
    #[error("system error, please contact administrator")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct InternalErrorBody<'a> {
    status: &'a str,
}

impl GatewayError {
    #[must_use]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::AuthorisationFieldMissing | Self::BearerTokenMalformed => StatusCode::BAD_REQUEST,
            Self::KeyNotAuthorised
            | Self::KeyExpired
            | Self::AccessDisallowed
            | Self::RateLimitExceeded
            | Self::QuotaLimitExceeded => StatusCode::FORBIDDEN,
            Self::PolicyViolation(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn message(self) -> String {
        match self {
            Self::PolicyViolation(status) => status.message().to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if matches!(self, Self::Internal) {
            serde_json::to_string(&InternalErrorBody {
                status: "system error, please contact administrator",
            })
        } else {
            let message = self.message();
            serde_json::to_string(&ErrorBody { error: &message })
        }
        .unwrap_or_else(|_| "{}".to_owned());

        let mut response = Response::builder()
            .status(status)
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .header(GENERATOR_HEADER, HeaderValue::from_static(GENERATOR_VALUE))
            .body(axum::body::Body::from(body))
            .expect("response with a fixed, valid header set always builds");
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_matches_spec() {
        assert_eq!(GatewayError::RateLimitExceeded.message(), "Key rate limit exceeded");
        assert_eq!(GatewayError::RateLimitExceeded.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn policy_violation_uses_request_status_message() {
        let err = GatewayError::PolicyViolation(RequestStatus::VersionExpired);
        assert_eq!(err.message(), "Api Version has expired");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_error_has_fixed_body() {
        assert_eq!(GatewayError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
