//! Access and refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs issued by `vurp` and carrying the
//! caller's agency, so every scoped query can be filtered without a lookup.
//! Refresh tokens are 32 random bytes, hex encoded; the database only ever
//! sees their SHA-256.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use vurp_core::types::DbId;

use crate::config::env_or;

/// `iss` of every access token.
pub const ISSUER: &str = "vurp";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    pub agency_id: DbId,
    /// `admin`, `owner` or `gestor`.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// | Env Var                    | Default      |
    /// |----------------------------|--------------|
    /// | `JWT_SECRET`               | required     |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | `15`         |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | `30`         |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set");

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 30),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation
    }
}

pub fn generate_access_token(
    user_id: DbId,
    agency_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        agency_id,
        role: role.to_owned(),
        iss: ISSUER.to_owned(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}

/// A freshly minted refresh token: hand `plaintext` to the client, store `hash`.
pub struct RefreshSecret {
    pub plaintext: String,
    pub hash: String,
}

pub fn generate_refresh_token() -> RefreshSecret {
    let plaintext = hex::encode(rand::random::<[u8; 32]>());
    let hash = hash_refresh_token(&plaintext);
    RefreshSecret { plaintext, hash }
}

pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
