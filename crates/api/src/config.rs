use std::fmt::Display;
use std::str::FromStr;

use vurp_core::billing::{Plan, PriceTable};
use vurp_core::usage_tracking::DEFAULT_STALE_MINS;

use crate::auth::jwt::JwtConfig;

/// Process configuration, read once from the environment at startup.
/// Defaults target local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Minutes without a heartbeat before a usage session is closed.
    pub usage_session_stale_mins: i64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Payment processor settings.
    pub stripe: StripeConfig,
}

/// Payment processor (Stripe) settings.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key. Empty disables checkout and portal.
    pub secret_key: String,
    /// Webhook signing secret. Empty rejects every webhook.
    pub webhook_secret: String,
    /// REST API base URL.
    pub api_base: String,
    /// Browser application URL used for redirect targets.
    pub app_base_url: String,
    /// Price id → plan lookup.
    pub prices: PriceTable,
}

/// Default payment processor API base.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

impl StripeConfig {
    /// Load payment processor settings from environment variables.
    ///
    /// | Env Var                  | Default                      |
    /// |--------------------------|------------------------------|
    /// | `STRIPE_SECRET_KEY`      | empty                        |
    /// | `STRIPE_WEBHOOK_SECRET`  | empty                        |
    /// | `STRIPE_API_BASE`        | `https://api.stripe.com/v1`  |
    /// | `APP_BASE_URL`           | `http://localhost:5173`      |
    /// | `STRIPE_PRICE_STARTER`   | empty (comma-separated ids)  |
    /// | `STRIPE_PRICE_PRO`       | empty (comma-separated ids)  |
    /// | `STRIPE_PRICE_AGENCY`    | empty (comma-separated ids)  |
    pub fn from_env() -> Self {
        let prices = PriceTable::new()
            .with_prices(Plan::Starter, price_ids("STRIPE_PRICE_STARTER"))
            .with_prices(Plan::Pro, price_ids("STRIPE_PRICE_PRO"))
            .with_prices(Plan::Agency, price_ids("STRIPE_PRICE_AGENCY"));

        Self {
            secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.into()),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into())
                .trim_end_matches('/')
                .to_string(),
            prices,
        }
    }
}

fn price_ids(var: &str) -> Vec<String> {
    comma_list(var, "")
}

impl ServerConfig {
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                       |
    /// | `USAGE_SESSION_STALE_MINS` | `30`                       |
    ///
    /// Nested settings: [`JwtConfig::from_env`], [`StripeConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: comma_list("CORS_ORIGINS", "http://localhost:5173"),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            usage_session_stale_mins: env_or("USAGE_SESSION_STALE_MINS", DEFAULT_STALE_MINS),
            jwt: JwtConfig::from_env(),
            stripe: StripeConfig::from_env(),
        }
    }
}

/// Parse `var`, falling back to `default` when it is unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse; a typo in the
/// environment should stop the process at startup.
pub fn env_or<T>(var: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{var}={raw:?} is invalid: {e}")),
        Err(_) => default,
    }
}

fn comma_list(var: &str, default: &str) -> Vec<String> {
    std::env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
