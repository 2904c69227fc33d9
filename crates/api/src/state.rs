use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use vurp_core::achievements::CHECK_INTERVAL;
use vurp_core::telemetry::DEDUPE_WINDOW;
use vurp_core::throttle::KeyedThrottle;
use vurp_core::types::DbId;

use crate::billing::PaymentGateway;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything non-trivial sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vurp_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Hosted checkout / billing portal client.
    pub payments: Arc<dyn PaymentGateway>,
    /// Per-user debounce for achievement checks.
    pub achievement_throttle: Arc<Mutex<KeyedThrottle<DbId>>>,
    /// Per-fingerprint dedupe for browser error reports.
    pub error_dedupe: Arc<Mutex<KeyedThrottle<String>>>,
    /// Process start, reported as uptime by `/health`.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        pool: vurp_db::DbPool,
        config: ServerConfig,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            payments,
            achievement_throttle: Arc::new(Mutex::new(KeyedThrottle::new(CHECK_INTERVAL))),
            error_dedupe: Arc::new(Mutex::new(KeyedThrottle::new(DEDUPE_WINDOW))),
            started_at: Instant::now(),
        }
    }
}
