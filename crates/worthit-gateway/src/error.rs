//! Maps [`CoreError`] onto HTTP responses, never leaking internals.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use worthit_core::CoreError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    request_id: String,
}

/// Wraps a [`CoreError`] so handlers can `?` into an axum response.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (code, message) = match &self.0 {
            CoreError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            CoreError::NotFound { resource } => (StatusCode::NOT_FOUND, format!("{resource} not found")),
            CoreError::CircuitOpen { service } => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("{service} is temporarily unavailable"))
            }
            CoreError::NoHealthyInstance { service } => {
                (StatusCode::SERVICE_UNAVAILABLE, format!("no healthy instance for {service}"))
            }
            CoreError::ConnectionUnavailable { .. } | CoreError::Timeout { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "upstream store is unavailable".to_string())
            }
            CoreError::UpstreamTransient { .. } | CoreError::UpstreamPermanent { .. } => {
                (StatusCode::BAD_GATEWAY, "an upstream service failed".to_string())
            }
            CoreError::Integrity { .. } | CoreError::Config { .. } | CoreError::Internal { .. } => {
                tracing::error!(error = %self.0, request_id, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "an internal error occurred".to_string())
            }
        };

        (
            code,
            Json(ErrorBody {
                status: "error",
                message,
                request_id,
            }),
        )
            .into_response()
    }
}
