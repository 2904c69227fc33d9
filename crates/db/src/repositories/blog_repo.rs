//! Repository for the `blog_posts` and `blog_post_likes` tables.
//!
//! View and like counters are adjusted in SQL so concurrent readers never
//! lose updates.

use sqlx::PgPool;
use vurp_core::types::DbId;

use crate::models::blog::{BlogPost, CreateBlogPost, LikeState, UpdateBlogPost};

const COLUMNS: &str = "id, slug, title, excerpt, content, author_name, cover_url, published_at, \
                       view_count, like_count, created_at, updated_at";

pub struct BlogRepo;

impl BlogRepo {
    /// Posts whose publication time has passed, newest first.
    pub async fn list_published(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM blog_posts
             WHERE published_at IS NOT NULL AND published_at <= NOW()
             ORDER BY published_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every post including drafts, for the admin editor.
    pub async fn list_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM blog_posts
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM blog_posts
             WHERE slug = $1 AND published_at IS NOT NULL AND published_at <= NOW()"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blog_posts WHERE id = $1");
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn slug_exists(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blog_posts WHERE slug = $1)")
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// Insert a post under an already-resolved `slug`.
    pub async fn create(
        pool: &PgPool,
        slug: &str,
        input: &CreateBlogPost,
    ) -> Result<BlogPost, sqlx::Error> {
        let query = format!(
            "INSERT INTO blog_posts
                (slug, title, excerpt, content, author_name, cover_url, published_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(slug)
            .bind(&input.title)
            .bind(&input.excerpt)
            .bind(&input.content)
            .bind(&input.author_name)
            .bind(&input.cover_url)
            .bind(input.published_at)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBlogPost,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!(
            "UPDATE blog_posts SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug),
                excerpt = COALESCE($4, excerpt),
                content = COALESCE($5, content),
                author_name = COALESCE($6, author_name),
                cover_url = COALESCE($7, cover_url),
                published_at = COALESCE($8, published_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .bind(&input.excerpt)
            .bind(&input.content)
            .bind(&input.author_name)
            .bind(&input.cover_url)
            .bind(input.published_at)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically bump the view counter of a published post. Returns the new
    /// count, or `None` if no such published post exists.
    pub async fn increment_view(pool: &PgPool, slug: &str) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE blog_posts SET view_count = view_count + 1
             WHERE slug = $1 AND published_at IS NOT NULL AND published_at <= NOW()
             RETURNING view_count",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    /// Toggle `visitor_id`'s like on a published post.
    ///
    /// The like row and the denormalised counter change in one transaction;
    /// the post row is locked first so concurrent toggles serialise.
    pub async fn toggle_like(
        pool: &PgPool,
        slug: &str,
        visitor_id: &str,
    ) -> Result<Option<LikeState>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let post_id = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM blog_posts
             WHERE slug = $1 AND published_at IS NOT NULL AND published_at <= NOW()
             FOR UPDATE",
        )
        .bind(slug)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(post_id) = post_id else {
            return Ok(None);
        };

        let removed = sqlx::query(
            "DELETE FROM blog_post_likes WHERE post_id = $1 AND visitor_id = $2",
        )
        .bind(post_id)
        .bind(visitor_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !removed {
            sqlx::query("INSERT INTO blog_post_likes (post_id, visitor_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(visitor_id)
                .execute(&mut *tx)
                .await?;
        }

        let delta: i64 = if removed { -1 } else { 1 };
        let like_count = sqlx::query_scalar::<_, i64>(
            "UPDATE blog_posts SET like_count = GREATEST(like_count + $2, 0)
             WHERE id = $1
             RETURNING like_count",
        )
        .bind(post_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(LikeState {
            liked: !removed,
            like_count,
        }))
    }
}
