//! Subscription plans, payment-processor statuses, and webhook signatures.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Starter,
    Pro,
    Agency,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Agency => "agency",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Plan::Free),
            "starter" => Some(Plan::Starter),
            "pro" => Some(Plan::Pro),
            "agency" => Some(Plan::Agency),
            _ => None,
        }
    }

    /// The plan whose limits apply to a stored `(plan, status)` pair. A
    /// lapsed or unknown subscription falls back to the free plan.
    pub fn effective(plan: &str, status: &str) -> Self {
        match Plan::parse(plan) {
            Some(plan) if SubscriptionStatus::from_processor(status).is_entitled() => plan,
            _ => Plan::Free,
        }
    }

    pub fn is_paid(self) -> bool {
        self != Plan::Free
    }

    /// Maximum number of active clients an agency on this plan may manage.
    /// `None` means unlimited.
    pub fn client_limit(self) -> Option<i64> {
        match self {
            Plan::Free => Some(3),
            Plan::Starter => Some(15),
            Plan::Pro => Some(50),
            Plan::Agency => None,
        }
    }
}

/// Static price-id → plan lookup table.
///
/// Price ids differ per payment-processor account and environment, so the
/// table is populated once from configuration at startup.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, Plan>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every price id in `ids` for `plan`.
    pub fn with_prices<I, S>(mut self, plan: Plan, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            let id = id.into();
            if !id.is_empty() {
                self.prices.insert(id, plan);
            }
        }
        self
    }

    pub fn plan_for_price(&self, price_id: &str) -> Option<Plan> {
        self.prices.get(price_id).copied()
    }

    /// Like [`plan_for_price`](Self::plan_for_price) but rejects unknown ids.
    pub fn require_plan(&self, price_id: &str) -> Result<Plan, CoreError> {
        self.plan_for_price(price_id)
            .ok_or_else(|| CoreError::Validation(format!("Unknown price id '{price_id}'")))
    }
}

// ---------------------------------------------------------------------------
// Subscription status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Incomplete,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
        }
    }

    /// Map a payment-processor subscription status onto ours.
    pub fn from_processor(status: &str) -> Self {
        match status {
            "trialing" => SubscriptionStatus::Trialing,
            "active" => SubscriptionStatus::Active,
            "past_due" | "unpaid" | "paused" => SubscriptionStatus::PastDue,
            "canceled" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Incomplete,
        }
    }

    /// Whether the subscription currently grants its plan's features.
    pub fn is_entitled(self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Trialing | SubscriptionStatus::Active | SubscriptionStatus::PastDue
        )
    }
}

// ---------------------------------------------------------------------------
// Webhook signatures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature header has no timestamp")]
    MissingTimestamp,
    #[error("signature header has no v1 signature")]
    MissingSignature,
    #[error("signature timestamp is outside the tolerance window")]
    Expired,
    #[error("signature does not match payload")]
    Mismatch,
    #[error("webhook secret is not configured")]
    NoSecret,
}

/// Compute the hex `v1` signature for `payload` signed at `timestamp`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> String {
    hex::encode(new_mac(secret, timestamp, payload).finalize().into_bytes())
}

fn new_mac(secret: &str, timestamp: i64, payload: &[u8]) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Verify a `Stripe-Signature`-style header (`t=<unix>,v1=<hex>[,v1=...]`).
///
/// Any `v1` entry matching the HMAC-SHA256 of `"{t}.{payload}"` is accepted,
/// provided `t` lies within [`SIGNATURE_TOLERANCE_SECS`] of `now`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::NoSecret);
    }

    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = v.parse().ok(),
            Some(("v1", v)) => signatures.push(v),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let mac = new_mac(secret, timestamp, payload);
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
