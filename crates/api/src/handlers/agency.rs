//! Handlers for `/agency` (the caller's tenant) and its managers.

use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;
use vurp_core::error::CoreError;
use vurp_core::referral::generate_code;
use vurp_core::roles::{ASSIGNABLE_ROLES, ROLE_GESTOR};
use vurp_core::types::DbId;
use vurp_db::models::agency::{Agency, UpdateAgency};
use vurp_db::models::user::{CreateManagerRequest, CreateUser, UpdateUser, UserResponse};
use vurp_db::repositories::{AgencyRepo, UserRepo};

use crate::auth::password::{check_password_policy, hash_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOwner;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

fn validate_role(role: &str) -> AppResult<()> {
    if ASSIGNABLE_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            ASSIGNABLE_ROLES.join(", ")
        ))))
    }
}

/// GET /api/v1/agency
pub async fn get_agency(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Agency>>> {
    let agency = AgencyRepo::find_by_id(&state.pool, auth.agency_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Agency",
            id: auth.agency_id,
        }))?;
    Ok(Json(DataResponse { data: agency }))
}

/// PUT /api/v1/agency
pub async fn update_agency(
    State(state): State<AppState>,
    RequireOwner(auth): RequireOwner,
    Json(mut input): Json<UpdateAgency>,
) -> AppResult<Json<DataResponse<Agency>>> {
    input.validate()?;
    if let Some(name) = input.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Agency name must not be blank".into(),
            )));
        }
    }
    let agency = AgencyRepo::update(&state.pool, auth.agency_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Agency",
            id: auth.agency_id,
        }))?;
    Ok(Json(DataResponse { data: agency }))
}

/// GET /api/v1/agency/managers
pub async fn list_managers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_by_agency(&state.pool, auth.agency_id).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/agency/managers
///
/// Create a member of the caller's agency with an initial password.
pub async fn create_manager(
    State(state): State<AppState>,
    RequireOwner(auth): RequireOwner,
    Json(input): Json<CreateManagerRequest>,
) -> AppResult<Created<UserResponse>> {
    input.validate()?;
    check_password_policy(&input.password)?;
    let role = input.role.as_deref().unwrap_or(ROLE_GESTOR);
    validate_role(role)?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Name must not be blank".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            agency_id: auth.agency_id,
            name: name.to_string(),
            email: input.email.trim().to_string(),
            password_hash,
            role: role.to_string(),
            referral_code: generate_code(),
            referred_by_user_id: None,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        agency_id = auth.agency_id,
        created_by = auth.user_id,
        "Manager created"
    );

    Ok(Created(user.into()))
}

/// PUT /api/v1/agency/managers/{id}
pub async fn update_manager(
    State(state): State<AppState>,
    RequireOwner(auth): RequireOwner,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;
    if let Some(role) = input.role.as_deref() {
        validate_role(role)?;
    }
    if id == auth.user_id && input.is_active == Some(false) {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }

    let user = UserRepo::update(&state.pool, auth.agency_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse { data: user.into() }))
}
