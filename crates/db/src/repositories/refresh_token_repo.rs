//! Single-use refresh tokens.

use sqlx::PgPool;
use vurp_core::types::DbId;

use crate::models::refresh_token::{IssueRefreshToken, RefreshToken};

const COLUMNS: &str = "id, user_id, token_hash, expires_at, consumed_at, revoked_at, \
                       user_agent, ip_address, created_at, updated_at";

pub struct RefreshTokenRepo;

impl RefreshTokenRepo {
    pub async fn issue(
        pool: &PgPool,
        input: &IssueRefreshToken<'_>,
    ) -> Result<RefreshToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(input.user_id)
            .bind(input.token_hash)
            .bind(input.expires_at)
            .bind(input.user_agent)
            .bind(input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Mark a live token as consumed and return it.
    ///
    /// The check and the stamp are one statement, so two concurrent refreshes
    /// presenting the same token cannot both succeed. `None` covers unknown,
    /// expired, revoked and already-consumed tokens alike.
    pub async fn consume(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<RefreshToken>, sqlx::Error> {
        let query = format!(
            "UPDATE refresh_tokens SET consumed_at = NOW()
             WHERE token_hash = $1
               AND consumed_at IS NULL
               AND revoked_at IS NULL
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke every live token of a user. Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW()
             WHERE user_id = $1 AND consumed_at IS NULL AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete tokens that expired, or were used up, more than `retain_days` ago.
    pub async fn purge_dead(pool: &PgPool, retain_days: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens
             WHERE LEAST(expires_at, COALESCE(consumed_at, revoked_at, expires_at))
                   < NOW() - make_interval(days => $1)",
        )
        .bind(retain_days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
