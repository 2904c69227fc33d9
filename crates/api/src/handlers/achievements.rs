//! Handlers for gamified achievements.

use std::collections::HashMap;
use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use vurp_core::achievements::{newly_unlocked, progress, RuleProgress, CATALOG};
use vurp_core::types::Timestamp;
use vurp_db::repositories::AchievementRepo;

use crate::error::{is_unique_violation, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const UNIQUE_USER_KEY: &str = "uq_user_achievements_user_key";

/// Result of `POST /achievements/check`.
#[derive(Debug, Serialize)]
pub struct AchievementCheck {
    /// `false` when the call was throttled and nothing was evaluated.
    pub checked: bool,
    pub unlocked: Vec<&'static str>,
}

/// One catalog entry as seen by the caller.
#[derive(Debug, Serialize)]
pub struct AchievementView {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub progress: RuleProgress,
    pub unlocked_at: Option<Timestamp>,
}

/// POST /api/v1/achievements/check
///
/// Evaluates the catalog at most once per user per check interval.
pub async fn check_achievements(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<AchievementCheck>>> {
    let acquired = state
        .achievement_throttle
        .lock()
        .await
        .try_acquire(auth.user_id, Instant::now());
    if !acquired {
        return Ok(Json(DataResponse {
            data: AchievementCheck {
                checked: false,
                unlocked: Vec::new(),
            },
        }));
    }

    match unlock_pending(&state, auth.user_id).await {
        Ok(unlocked) => {
            if !unlocked.is_empty() {
                tracing::info!(user_id = auth.user_id, ?unlocked, "Achievements unlocked");
            }
            Ok(Json(DataResponse {
                data: AchievementCheck {
                    checked: true,
                    unlocked,
                },
            }))
        }
        Err(e) => {
            // Let the client retry right away instead of waiting out the window.
            state
                .achievement_throttle
                .lock()
                .await
                .release(&auth.user_id);
            Err(e)
        }
    }
}

async fn unlock_pending(
    state: &AppState,
    user_id: vurp_core::types::DbId,
) -> AppResult<Vec<&'static str>> {
    let counters = AchievementRepo::counters(&state.pool, user_id).await?;
    let existing = AchievementRepo::list_for_user(&state.pool, user_id).await?;
    let candidates = newly_unlocked(
        &counters,
        existing.iter().map(|a| a.achievement_key.as_str()),
    );

    let mut unlocked = Vec::with_capacity(candidates.len());
    for key in candidates {
        match AchievementRepo::insert(&state.pool, user_id, key).await {
            Ok(_) => unlocked.push(key),
            // A concurrent check already recorded it.
            Err(e) if is_unique_violation(&e, UNIQUE_USER_KEY) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(unlocked)
}

/// GET /api/v1/achievements
pub async fn list_achievements(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<AchievementView>>>> {
    let counters = AchievementRepo::counters(&state.pool, auth.user_id).await?;
    let unlocked: HashMap<String, Timestamp> =
        AchievementRepo::list_for_user(&state.pool, auth.user_id)
            .await?
            .into_iter()
            .map(|a| (a.achievement_key, a.unlocked_at))
            .collect();

    let views = CATALOG
        .iter()
        .map(|rule| AchievementView {
            key: rule.key,
            title: rule.title,
            description: rule.description,
            progress: progress(rule, &counters),
            unlocked_at: unlocked.get(rule.key).copied(),
        })
        .collect();
    Ok(Json(DataResponse { data: views }))
}
