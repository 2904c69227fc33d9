//! Repository for the `users` table.

use sqlx::{PgPool, Postgres, Transaction};
use vurp_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User};

const COLUMNS: &str = "id, agency_id, name, email, password_hash, role, referral_code, \
                        referred_by_user_id, is_active, failed_login_count, locked_until, \
                        last_login_at, created_at, updated_at";

/// Agency members and platform admins. Emails are stored lower-cased.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let user = Self::create_in_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Insert a new user inside an open transaction.
    pub async fn create_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateUser,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users
                (agency_id, name, email, password_hash, role, referral_code, referred_by_user_id)
             VALUES ($1, $2, lower($3), $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.agency_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.referral_code)
            .bind(input.referred_by_user_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by ID within an agency.
    pub async fn find_in_agency(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND agency_id = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(agency_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by referral code.
    pub async fn find_by_referral_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE referral_code = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List every member of an agency, owners first.
    pub async fn list_by_agency(pool: &PgPool, agency_id: DbId) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users WHERE agency_id = $1
             ORDER BY (role = 'owner') DESC, name ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(agency_id)
            .fetch_all(pool)
            .await
    }

    /// Update an agency member. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        agency_id: DbId,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($3, name),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active)
             WHERE id = $1 AND agency_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(agency_id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Count a failed password attempt.
    ///
    /// The attempt that reaches `max_attempts` locks the account for
    /// `lock_mins` and restarts the counter, so the user gets a fresh series
    /// once the lock lapses. Returns whether this attempt locked the account.
    pub async fn record_failed_login(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_mins: i32,
    ) -> Result<bool, sqlx::Error> {
        let locked = sqlx::query_scalar::<_, bool>(
            "UPDATE users SET
                failed_login_count = CASE WHEN failed_login_count + 1 >= $2
                                          THEN 0 ELSE failed_login_count + 1 END,
                locked_until = CASE WHEN failed_login_count + 1 >= $2
                                    THEN NOW() + make_interval(mins => $3)
                                    ELSE locked_until END
             WHERE id = $1
             RETURNING failed_login_count = 0",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_mins)
        .fetch_optional(pool)
        .await?;
        Ok(locked.unwrap_or(false))
    }

    /// Reset failure counters and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users
             SET failed_login_count = 0, locked_until = NULL, last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
