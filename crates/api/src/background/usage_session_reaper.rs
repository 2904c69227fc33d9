//! Periodic closing of abandoned usage sessions.
//!
//! A tab that crashes or loses connectivity never sends its final beacon.
//! Sessions without a heartbeat for `stale_mins` are closed with
//! `ended_at = last_seen_at`, so their recorded duration stays what the
//! last autosave reported.

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use vurp_core::usage_tracking::REAP_INTERVAL;
use vurp_db::repositories::UsageSessionRepo;

/// Run the reaper loop until `cancel` is triggered.
pub async fn run(pool: PgPool, stale_mins: i64, cancel: CancellationToken) {
    tracing::info!(
        stale_mins,
        interval_secs = REAP_INTERVAL.as_secs(),
        "Usage session reaper started"
    );

    let mut interval = tokio::time::interval(REAP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Usage session reaper stopping");
                break;
            }
            _ = interval.tick() => {
                match UsageSessionRepo::close_stale(&pool, stale_mins).await {
                    Ok(0) => tracing::debug!("Usage session reaper: nothing to close"),
                    Ok(closed) => tracing::info!(closed, "Usage session reaper: closed stale sessions"),
                    Err(e) => tracing::error!(error = %e, "Usage session reaper failed"),
                }
            }
        }
    }
}
