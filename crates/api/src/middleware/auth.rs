//! Bearer-token extractors.
//!
//! The token alone identifies the caller and their agency; no database
//! round trip happens here.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use vurp_core::error::CoreError;
use vurp_core::types::DbId;

use crate::auth::jwt::{validate_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// The signed-in caller. Rejects with 401 when the token is missing or bad.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Tenant every scoped query is filtered by.
    pub agency_id: DbId,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            agency_id: claims.agency_id,
            role: claims.role,
        }
    }
}

/// The raw token from a `Bearer` authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Decode `token` into an [`AuthUser`], or `None` if it is invalid or expired.
pub fn user_from_token(token: &str, config: &JwtConfig) -> Option<AuthUser> {
    validate_token(token, config).ok().map(AuthUser::from)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = |msg: &str| AppError::Core(CoreError::Unauthorized(msg.into()));

        if !parts.headers.contains_key(AUTHORIZATION) {
            return Err(unauthorized("Missing Authorization header"));
        }
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| unauthorized("Expected 'Authorization: Bearer <token>'"))?;
        user_from_token(token, &state.config.jwt)
            .ok_or_else(|| unauthorized("Invalid or expired token"))
    }
}

/// Optional authentication for endpoints anonymous visitors may call.
///
/// A missing, malformed, or expired token yields `MaybeAuthUser(None)`
/// instead of a rejection.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(&parts.headers)
            .and_then(|token| user_from_token(token, &state.config.jwt));
        Ok(MaybeAuthUser(user))
    }
}
