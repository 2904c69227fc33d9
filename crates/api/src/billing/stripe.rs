//! [`PaymentGateway`] over the Stripe REST API.
//!
//! Requests are form-encoded and authenticated with the secret key as a
//! bearer token.

use async_trait::async_trait;
use serde::Deserialize;

use super::{CheckoutRequest, GatewayError, HostedSession, PaymentGateway};
use crate::config::StripeConfig;

pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    async fn post_form(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<HostedSession, GatewayError> {
        if self.secret_key.is_empty() {
            return Err(GatewayError::NotConfigured);
        }

        let response = self
            .client
            .post(format!("{}{path}", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        let url = session.url.ok_or_else(|| GatewayError::Api {
            status: status.as_u16(),
            message: "session has no url".to_string(),
        })?;
        Ok(HostedSession {
            id: session.id,
            url,
        })
    }
}

/// Form fields for a subscription checkout session.
fn checkout_params(request: &CheckoutRequest) -> Vec<(String, String)> {
    let agency_id = request.agency_id.to_string();
    let mut params: Vec<(String, String)> = vec![
        ("mode".into(), "subscription".into()),
        ("line_items[0][price]".into(), request.price_id.clone()),
        ("line_items[0][quantity]".into(), "1".into()),
        ("success_url".into(), request.success_url.clone()),
        ("cancel_url".into(), request.cancel_url.clone()),
        ("client_reference_id".into(), agency_id.clone()),
        ("metadata[agency_id]".into(), agency_id.clone()),
        ("metadata[price_id]".into(), request.price_id.clone()),
        ("subscription_data[metadata][agency_id]".into(), agency_id),
    ];
    match (&request.customer_id, &request.customer_email) {
        (Some(customer), _) => params.push(("customer".into(), customer.clone())),
        (None, Some(email)) => params.push(("customer_email".into(), email.clone())),
        (None, None) => {}
    }
    params
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<HostedSession, GatewayError> {
        self.post_form("/checkout/sessions", &checkout_params(request)).await
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<HostedSession, GatewayError> {
        let params = vec![
            ("customer".to_string(), customer_id.to_string()),
            ("return_url".to_string(), return_url.to_string()),
        ];
        self.post_form("/billing_portal/sessions", &params).await
    }
}
