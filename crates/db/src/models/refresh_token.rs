//! Issued refresh tokens.

use sqlx::FromRow;
use vurp_core::types::{DbId, Timestamp};

/// A row from `refresh_tokens`. Only the SHA-256 of the token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RefreshToken {
    /// Still exchangeable at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.consumed_at.is_none() && self.revoked_at.is_none() && self.expires_at > now
    }
}

pub struct IssueRefreshToken<'a> {
    pub user_id: DbId,
    pub token_hash: &'a str,
    pub expires_at: Timestamp,
    pub user_agent: Option<&'a str>,
    pub ip_address: Option<&'a str>,
}
