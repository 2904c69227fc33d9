//! Public blog plus its admin surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use vurp_core::error::CoreError;
use vurp_core::naming::{slugify, with_suffix};
use vurp_core::types::DbId;
use vurp_db::models::blog::{BlogPost, CreateBlogPost, LikeRequest, LikeState, UpdateBlogPost};
use vurp_db::repositories::BlogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{Created, DataResponse};
use crate::state::AppState;

const MAX_SLUG_ATTEMPTS: u32 = 50;
const MAX_VISITOR_ID_LEN: usize = 100;

#[derive(Debug, Serialize)]
pub struct ViewCount {
    pub view_count: i64,
}

fn post_not_found(slug: &str) -> AppError {
    AppError::NotFound(format!("Blog post '{slug}' not found"))
}

fn require_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }
    Ok(())
}

fn explicit_slug(raw: &str) -> AppResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "slug must contain at least one letter or digit".into(),
        )));
    }
    Ok(slug)
}

/// First free slug derived from `title`.
async fn derive_slug(state: &AppState, title: &str) -> AppResult<String> {
    let base = match slugify(title) {
        s if s.is_empty() => "post".to_string(),
        s => s,
    };
    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = with_suffix(&base, attempt);
        if !BlogRepo::slug_exists(&state.pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Core(CoreError::Conflict(format!(
        "No free slug for '{base}'"
    ))))
}

// ---------------------------------------------------------------------------
// Public
// ---------------------------------------------------------------------------

/// GET /api/v1/blog/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<BlogPost>>>> {
    let (limit, offset) = params.resolve();
    let posts = BlogRepo::list_published(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// GET /api/v1/blog/posts/{slug}
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<BlogPost>>> {
    let post = BlogRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| post_not_found(&slug))?;
    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/blog/posts/{slug}/view
pub async fn record_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<ViewCount>>> {
    let view_count = BlogRepo::increment_view(&state.pool, &slug)
        .await?
        .ok_or_else(|| post_not_found(&slug))?;
    Ok(Json(DataResponse {
        data: ViewCount { view_count },
    }))
}

/// POST /api/v1/blog/posts/{slug}/like
///
/// Toggles: a second call from the same visitor removes the like.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<LikeRequest>,
) -> AppResult<Json<DataResponse<LikeState>>> {
    let visitor_id = input.visitor_id.trim();
    if visitor_id.is_empty() || visitor_id.len() > MAX_VISITOR_ID_LEN {
        return Err(AppError::BadRequest(format!(
            "visitor_id must be 1 to {MAX_VISITOR_ID_LEN} characters"
        )));
    }
    let state_after = BlogRepo::toggle_like(&state.pool, &slug, visitor_id)
        .await?
        .ok_or_else(|| post_not_found(&slug))?;
    Ok(Json(DataResponse { data: state_after }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/blog/admin/posts
///
/// Includes drafts and scheduled posts.
pub async fn admin_list_posts(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<BlogPost>>>> {
    let (limit, offset) = params.resolve();
    let posts = BlogRepo::list_all(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: posts }))
}

/// POST /api/v1/blog/admin/posts
pub async fn create_post(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateBlogPost>,
) -> AppResult<Created<BlogPost>> {
    require_title(&input.title)?;
    let slug = match input.slug.as_deref() {
        Some(raw) => explicit_slug(raw)?,
        None => derive_slug(&state, &input.title).await?,
    };
    let post = BlogRepo::create(&state.pool, &slug, &input).await?;
    tracing::info!(post_id = post.id, slug = %post.slug, user_id = admin.user_id, "Blog post created");
    Ok(Created(post))
}

/// PUT /api/v1/blog/admin/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateBlogPost>,
) -> AppResult<Json<DataResponse<BlogPost>>> {
    if let Some(title) = input.title.as_deref() {
        require_title(title)?;
    }
    if let Some(raw) = input.slug.take() {
        input.slug = Some(explicit_slug(&raw)?);
    }
    let post = BlogRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "BlogPost",
            id,
        }))?;
    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/blog/admin/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if BlogRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "BlogPost",
            id,
        }))
    }
}
