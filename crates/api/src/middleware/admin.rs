//! Admin gate for mutating endpoints.
//!
//! The admin surface authenticates with a shared secret sent as
//! `Authorization: Bearer <ADMIN_API_KEY>`. When no key is configured the
//! gate is open, which is the local development setup.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use trattoria_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Proof that the request carried the admin key.
///
/// ```ignore
/// async fn mutate(_admin: RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_key.as_deref() else {
            return Ok(RequireAdmin);
        };

        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        if !constant_time_eq(token.trim().as_bytes(), expected.as_bytes()) {
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid admin key".into(),
            )));
        }

        Ok(RequireAdmin)
    }
}

/// Compare without an early exit on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_keys_match() {
        assert!(constant_time_eq(b"s3cret", b"s3cret"));
    }

    #[test]
    fn different_keys_do_not_match() {
        assert!(!constant_time_eq(b"s3cret", b"s3creT"));
        assert!(!constant_time_eq(b"s3cret", b"s3cret-longer"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
