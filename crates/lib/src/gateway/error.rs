//! Translation of gateway failures into HTTP responses.
//!
//! Bodies use `{ "detail": "..." }`, the shape browser clients already parse.

use crate::envelope::EnvelopeError;
use crate::upstream::UpstreamError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Envelope(EnvelopeError::Missing) => StatusCode::BAD_REQUEST,
            ApiError::Envelope(EnvelopeError::Invalid { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Upstream(UpstreamError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(UpstreamError::Status { status, .. }) => *status,
            ApiError::Upstream(UpstreamError::Decode(_) | UpstreamError::Request(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Upstream(UpstreamError::Timeout) => {
                "Databricks agent took too long to respond.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_bad_request() {
        let e = ApiError::from(EnvelopeError::Missing);
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.detail(), "Missing 'input' field in request body");
    }

    #[test]
    fn timeout_is_gateway_timeout() {
        let e = ApiError::from(UpstreamError::Timeout);
        assert_eq!(e.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(e.detail().contains("too long"));
    }

    #[test]
    fn upstream_status_passes_through() {
        let e = ApiError::from(UpstreamError::Status {
            status: StatusCode::FORBIDDEN,
            body: "denied".to_string(),
        });
        assert_eq!(e.status(), StatusCode::FORBIDDEN);
        assert_eq!(e.detail(), "upstream returned 403 Forbidden");
    }

    #[test]
    fn invalid_field_is_unprocessable() {
        let source = serde_json::from_str::<String>("1").unwrap_err();
        let e = ApiError::from(EnvelopeError::Invalid {
            field: "message",
            source,
        });
        assert_eq!(e.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(e.detail().contains("'message'"));
    }
}
