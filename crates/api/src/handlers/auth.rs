//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;
use vurp_core::error::CoreError;
use vurp_core::naming::{slugify, with_suffix};
use vurp_core::referral::{generate_code, normalize_code};
use vurp_core::roles::ROLE_OWNER;
use vurp_db::models::refresh_token::IssueRefreshToken;
use vurp_db::models::user::{CreateUser, User, UserResponse};
use vurp_db::repositories::{AgencyRepo, RefreshTokenRepo, ReferralRepo, SubscriptionRepo, UserRepo};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{check_password_policy, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i32 = 15;

/// Slug candidates tried before giving up on a readable agency slug.
const MAX_SLUG_ATTEMPTS: u32 = 20;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub agency_name: String,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    pub referral_code: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an agency with its owner, a free subscription and, when a valid
/// referral code is given, a `signed_up` referral for the referrer.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;
    let agency_name = input.agency_name.trim();
    let name = input.name.trim();
    if agency_name.is_empty() || name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Agency name and name must not be blank".into(),
        )));
    }
    check_password_policy(&input.password)?;

    if UserRepo::find_by_email(&state.pool, &input.email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let referrer = match input.referral_code.as_deref().map(normalize_code) {
        Some(code) if !code.is_empty() => {
            UserRepo::find_by_referral_code(&state.pool, &code).await?
        }
        _ => None,
    };

    let slug = unique_agency_slug(&state, agency_name).await?;
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let agency = AgencyRepo::create_in_tx(&mut tx, agency_name, &slug).await?;
    let user = UserRepo::create_in_tx(
        &mut tx,
        &CreateUser {
            agency_id: agency.id,
            name: name.to_string(),
            email: input.email.trim().to_string(),
            password_hash,
            role: ROLE_OWNER.to_string(),
            referral_code: generate_code(),
            referred_by_user_id: referrer.as_ref().map(|r| r.id),
        },
    )
    .await?;
    SubscriptionRepo::create_free_in_tx(&mut tx, agency.id).await?;
    if let Some(referrer) = &referrer {
        ReferralRepo::record_signup_in_tx(&mut tx, referrer.id, &user.email, user.id).await?;
    }
    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        agency_id = agency.id,
        referred = referrer.is_some(),
        "Agency registered"
    );

    let response = create_auth_response(&state, user, &headers).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let locked = UserRepo::record_failed_login(
            &state.pool,
            user.id,
            MAX_FAILED_ATTEMPTS,
            LOCK_DURATION_MINS,
        )
        .await?;
        if locked {
            tracing::warn!(user_id = user.id, "Account locked after repeated failures");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let response = create_auth_response(&state, user, &headers).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let consumed = RefreshTokenRepo::consume(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, consumed.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(&state, user, &headers).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke every outstanding refresh token of the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = RefreshTokenRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::debug!(user_id = auth_user.user_id, revoked, "Refresh tokens revoked");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    Ok(Json(DataResponse { data: user.into() }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Client address as reported by the reverse proxy: the first hop of
/// `X-Forwarded-For`, else `X-Real-IP`.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    let real_ip = || headers.get(X_REAL_IP).and_then(|v| v.to_str().ok());
    forwarded
        .or_else(real_ip)
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// First free slug among `acme`, `acme-2`, `acme-3`, ...
///
/// A concurrent registration can still take the slug between this check and
/// the insert; the unique constraint then answers 409.
async fn unique_agency_slug(state: &AppState, agency_name: &str) -> AppResult<String> {
    let base = match slugify(agency_name) {
        s if s.is_empty() => "agencia".to_string(),
        s => s,
    };
    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = with_suffix(&base, attempt);
        if !AgencyRepo::slug_exists(&state.pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Ok(format!("{base}-{}", generate_code().to_ascii_lowercase()))
}

/// Sign an access token, issue a fresh refresh token, and build the response.
async fn create_auth_response(
    state: &AppState,
    user: User,
    headers: &HeaderMap,
) -> AppResult<AuthResponse> {
    let access_token =
        generate_access_token(user.id, user.agency_id, &user.role, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let agent = user_agent(headers);
    let ip_address = client_ip(headers);
    RefreshTokenRepo::issue(
        &state.pool,
        &IssueRefreshToken {
            user_id: user.id,
            token_hash: &refresh.hash,
            expires_at,
            user_agent: agent.as_deref(),
            ip_address: ip_address.as_deref(),
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: user.into(),
    })
}
