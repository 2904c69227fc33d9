//! Probes for the load balancer and uptime monitoring.
//!
//! ```text
//! GET /health   liveness, never touches the database
//! GET /ready    readiness, pings the database; 503 while it is unreachable
//! ```

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub db_healthy: bool,
    pub db_latency_ms: u64,
    /// Whether checkout and the billing portal can reach the payment processor.
    pub billing_configured: bool,
}

async fn liveness(State(state): State<AppState>) -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let started = Instant::now();
    let db_healthy = match vurp_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe: database unreachable");
            false
        }
    };
    let body = Readiness {
        status: if db_healthy { "ready" } else { "unavailable" },
        db_healthy,
        db_latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        billing_configured: !state.config.stripe.secret_key.is_empty(),
    };
    let code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body))
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/ready", get(readiness))
}
