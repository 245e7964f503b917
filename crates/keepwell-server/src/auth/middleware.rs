use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

use super::jwt::Claims;
use crate::routes::AppState;

/// Extracts and verifies a bearer token, making `Claims` available to any
/// handler that takes it as an argument. Missing/invalid tokens short
/// circuit with 401 before the handler body runs.
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "missing bearer token"))?;

        state
            .jwt_service
            .verify_token(token)
            .map(AuthUser)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid or expired token"))
    }
}
