use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keepwell_core::error::CoreError;
use serde_json::json;

/// Maps a `CoreError` to the `{"error": {code, message, details?}}` envelope
/// and a status code. No kind is ever swallowed silently at this boundary.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self.0 {
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", None),
            CoreError::Auth(_) => (StatusCode::UNAUTHORIZED, "auth_error", None),
            CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            CoreError::Conflict(_) => (StatusCode::CONFLICT, "conflict", None),
            CoreError::RateLimited { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                Some(json!({ "retry_after_seconds": retry_after_secs })),
            ),
            CoreError::UnavailableExternal(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable_external", None)
            }
            CoreError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.0.to_string(),
                "details": details,
            }
        }));

        (status, body).into_response()
    }
}
