//! Periodic eviction of expired in-memory throttle entries.
//!
//! Both the error-report dedupe map and the achievement-check debounce grow
//! by one entry per key; without pruning they would hold every fingerprint
//! and user ever seen.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use vurp_core::telemetry::PRUNE_INTERVAL;

use crate::state::AppState;

/// Run the prune loop until `cancel` is triggered.
pub async fn run(state: AppState, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = PRUNE_INTERVAL.as_secs(),
        "Throttle prune task started"
    );

    let mut interval = tokio::time::interval(PRUNE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Throttle prune task stopping");
                break;
            }
            _ = interval.tick() => {
                let (errors, checks) = prune_once(&state, Instant::now()).await;
                if errors + checks > 0 {
                    tracing::debug!(errors, checks, "Pruned expired throttle entries");
                }
            }
        }
    }
}

/// Prune both maps once. Returns `(error_entries, achievement_entries)` removed.
pub async fn prune_once(state: &AppState, now: Instant) -> (usize, usize) {
    let errors = state.error_dedupe.lock().await.prune(now);
    let checks = state.achievement_throttle.lock().await.prune(now);
    (errors, checks)
}
