//! Role gates layered on [`AuthUser`].
//!
//! A gate first authenticates (401 on failure) and then checks the role
//! (403 on failure). Handlers destructure the gate to get the caller:
//!
//! ```ignore
//! async fn update_agency(RequireOwner(owner): RequireOwner) { /* ... */ }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use vurp_core::error::CoreError;
use vurp_core::roles::{can_manage_agency, is_platform_admin};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn gate(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&str) -> bool,
    denied: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if allowed(&user.role) {
        Ok(user)
    } else {
        tracing::debug!(user_id = user.user_id, role = %user.role, "Role gate refused");
        Err(AppError::Core(CoreError::Forbidden(denied.into())))
    }
}

/// Platform staff: blog administration and error telemetry.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, is_platform_admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Agency owner (or platform admin): billing, agency profile, gestores.
pub struct RequireOwner(pub AuthUser);

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        gate(parts, state, can_manage_agency, "Owner role required")
            .await
            .map(RequireOwner)
    }
}
