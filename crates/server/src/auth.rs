use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Gate for mutating endpoints: the `Authorization` header must equal the
/// configured shared secret. Plain equality, not timing-safe.
pub fn require_admin_token(
    headers: &HeaderMap,
    admin_token: &SecretString,
) -> Result<(), ApiError> {
    let supplied = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if supplied != admin_token.expose_secret() {
        return Err(ApiError::Unauthorized);
    }

    Ok(())
}
