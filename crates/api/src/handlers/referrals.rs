//! Handlers for the referral program.

use axum::extract::State;
use axum::Json;
use validator::Validate;
use vurp_core::error::CoreError;
use vurp_core::referral::reward_progress;
use vurp_db::models::referral::{CreateReferral, Referral, ReferralSummary};
use vurp_db::repositories::{ReferralRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

/// GET /api/v1/referrals
pub async fn list_referrals(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Referral>>>> {
    let referrals = ReferralRepo::list_for_referrer(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: referrals }))
}

/// POST /api/v1/referrals
///
/// Records an invite. Inviting the same email twice is a 409.
pub async fn create_referral(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateReferral>,
) -> AppResult<Created<Referral>> {
    input.validate()?;
    let referral = ReferralRepo::create(&state.pool, auth.user_id, &input.email).await?;
    tracing::info!(referral_id = referral.id, user_id = auth.user_id, "Referral invite recorded");
    Ok(Created(referral))
}

/// GET /api/v1/referrals/summary
pub async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<ReferralSummary>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let counts = ReferralRepo::counts(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: ReferralSummary {
            referral_code: user.referral_code,
            total: counts.total,
            signed_up: counts.signed_up,
            converted: counts.converted,
            rewards: reward_progress(counts.converted),
        },
    }))
}
