//! Payment processor integration.
//!
//! - [`PaymentGateway`] is the seam handlers call for hosted checkout and
//!   billing-portal sessions; [`stripe::StripeGateway`] implements it over
//!   the processor's REST API.
//! - [`events`] decodes signed webhook payloads into [`events::BillingEvent`]s.

pub mod events;
pub mod stripe;

use async_trait::async_trait;
use serde::Serialize;
use vurp_core::types::DbId;

/// Failure talking to the payment processor.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("payment processor is not configured")]
    NotConfigured,

    #[error("payment processor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment processor returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Parameters for a subscription checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub agency_id: DbId,
    pub price_id: String,
    /// Existing processor customer to attach the subscription to.
    pub customer_id: Option<String>,
    /// Prefills the checkout form when no customer exists yet.
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// A hosted page the browser is redirected to.
#[derive(Debug, Clone, Serialize)]
pub struct HostedSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<HostedSession, GatewayError>;

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession, GatewayError>;
}
