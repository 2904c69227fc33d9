//! Blog post model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vurp_core::types::{DbId, Timestamp};

/// A row from the `blog_posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlogPost {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author_name: Option<String>,
    pub cover_url: Option<String>,
    pub published_at: Option<Timestamp>,
    pub view_count: i64,
    pub like_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a post. `slug` is derived from the title when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlogPost {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    pub author_name: Option<String>,
    pub cover_url: Option<String>,
    pub published_at: Option<Timestamp>,
}

/// DTO for updating a post. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author_name: Option<String>,
    pub cover_url: Option<String>,
    pub published_at: Option<Timestamp>,
}

/// Body of `POST /blog/posts/{slug}/like`.
#[derive(Debug, Clone, Deserialize)]
pub struct LikeRequest {
    pub visitor_id: String,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}
