//! Hourly deletion of dead refresh tokens.
//!
//! Every login and every refresh inserts a row. Consumed, revoked and expired
//! rows are kept for [`RETAIN_DAYS`] for auditing, then deleted.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use vurp_db::repositories::RefreshTokenRepo;

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Days a dead token row is kept before deletion.
pub const RETAIN_DAYS: i32 = 7;

pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(retain_days = RETAIN_DAYS, "Refresh token purge started");

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Refresh token purge stopping");
                break;
            }
            _ = interval.tick() => {
                match RefreshTokenRepo::purge_dead(&pool, RETAIN_DAYS).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "Purged dead refresh tokens"),
                    Err(e) => tracing::error!(error = %e, "Refresh token purge failed"),
                }
            }
        }
    }
}
