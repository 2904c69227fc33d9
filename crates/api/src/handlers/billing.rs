//! Billing: hosted checkout, billing portal, and processor webhooks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vurp_core::billing::{verify_signature, Plan, SubscriptionStatus};
use vurp_core::error::CoreError;
use vurp_core::types::DbId;
use vurp_db::models::subscription::{Subscription, UpsertSubscription};
use vurp_db::repositories::{ReferralRepo, SubscriptionRepo, UserRepo};

use crate::billing::events::{BillingEvent, StripeEvent, SubscriptionSnapshot};
use crate::billing::{CheckoutRequest, HostedSession};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireOwner;
use crate::response::DataResponse;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub price_id: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

/// The stored subscription plus the limits currently in force.
#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub effective_plan: Plan,
    pub client_limit: Option<i64>,
}

/// POST /api/v1/billing/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    RequireOwner(auth): RequireOwner,
    Json(body): Json<CheckoutBody>,
) -> AppResult<Json<DataResponse<HostedSession>>> {
    let stripe = &state.config.stripe;
    let plan = stripe.prices.require_plan(&body.price_id)?;

    let customer_id = SubscriptionRepo::find_by_agency(&state.pool, auth.agency_id)
        .await?
        .and_then(|s| s.stripe_customer_id);
    let customer_email = if customer_id.is_none() {
        UserRepo::find_by_id(&state.pool, auth.user_id)
            .await?
            .map(|u| u.email)
    } else {
        None
    };

    let request = CheckoutRequest {
        agency_id: auth.agency_id,
        price_id: body.price_id,
        customer_id,
        customer_email,
        success_url: format!("{}/billing?checkout=success", stripe.app_base_url),
        cancel_url: format!("{}/billing?checkout=cancel", stripe.app_base_url),
    };
    let session = state.payments.create_checkout_session(&request).await?;
    tracing::info!(
        agency_id = auth.agency_id,
        plan = plan.as_str(),
        session_id = %session.id,
        "Checkout session created"
    );
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/billing/portal
pub async fn create_portal(
    State(state): State<AppState>,
    RequireOwner(auth): RequireOwner,
) -> AppResult<Json<DataResponse<HostedSession>>> {
    let customer_id = SubscriptionRepo::find_by_agency(&state.pool, auth.agency_id)
        .await?
        .and_then(|s| s.stripe_customer_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Agency has no billing account yet".into(),
            ))
        })?;
    let return_url = format!("{}/billing", state.config.stripe.app_base_url);
    let session = state
        .payments
        .create_portal_session(&customer_id, &return_url)
        .await?;
    Ok(Json(DataResponse { data: session }))
}

/// GET /api/v1/billing/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<SubscriptionView>>> {
    let subscription = SubscriptionRepo::find_by_agency(&state.pool, auth.agency_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscription",
            id: auth.agency_id,
        }))?;
    let effective_plan = Plan::effective(&subscription.plan, &subscription.status);
    Ok(Json(DataResponse {
        data: SubscriptionView {
            subscription,
            effective_plan,
            client_limit: effective_plan.client_limit(),
        },
    }))
}

/// POST /api/v1/billing/webhook
///
/// Authenticated by signature only. Each event id is processed once; a
/// failed event is forgotten again so the processor's retry is handled.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    verify_signature(
        &body,
        signature,
        &state.config.stripe.webhook_secret,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook signature");
        AppError::BadRequest(format!("Invalid webhook signature: {e}"))
    })?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook event: {e}")))?;
    let billing_event = BillingEvent::from_event(&event)?;

    if !SubscriptionRepo::record_webhook_event(&state.pool, &event.id, &event.event_type).await? {
        tracing::info!(event_id = %event.id, "Duplicate webhook event acknowledged");
        return Ok(Json(WebhookAck {
            received: true,
            duplicate: true,
        }));
    }

    if let Err(e) = apply_event(&state, billing_event).await {
        tracing::error!(event_id = %event.id, event_type = %event.event_type, error = %e, "Webhook processing failed");
        if let Err(forget_err) = SubscriptionRepo::forget_webhook_event(&state.pool, &event.id).await
        {
            tracing::error!(event_id = %event.id, error = %forget_err, "Failed to forget webhook event");
        }
        return Err(e);
    }

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Webhook event processed");
    Ok(Json(WebhookAck {
        received: true,
        duplicate: false,
    }))
}

async fn apply_event(state: &AppState, event: BillingEvent) -> AppResult<()> {
    let prices = &state.config.stripe.prices;
    match event {
        BillingEvent::CheckoutCompleted {
            agency_id,
            customer_id,
            subscription_id,
            price_id,
        } => {
            let Some(agency_id) = agency_id else {
                tracing::warn!("Checkout completed without an agency reference");
                return Ok(());
            };
            let plan = price_id.as_deref().and_then(|p| prices.plan_for_price(p));
            SubscriptionRepo::upsert(
                &state.pool,
                &UpsertSubscription {
                    agency_id,
                    stripe_customer_id: customer_id,
                    stripe_subscription_id: subscription_id,
                    plan,
                    status: SubscriptionStatus::Active,
                    current_period_end: None,
                    cancel_at_period_end: None,
                },
            )
            .await?;
            if plan.is_some_and(Plan::is_paid) {
                convert_referrals(state, agency_id).await?;
            }
        }
        BillingEvent::SubscriptionChanged(snapshot) => {
            apply_snapshot(state, snapshot).await?;
        }
        BillingEvent::SubscriptionDeleted { subscription_id } => {
            if SubscriptionRepo::cancel_by_stripe_id(&state.pool, &subscription_id)
                .await?
                .is_none()
            {
                tracing::warn!(%subscription_id, "Deleted subscription is unknown");
            }
        }
        BillingEvent::PaymentFailed { subscription_id } => {
            SubscriptionRepo::set_status_by_stripe_id(
                &state.pool,
                &subscription_id,
                SubscriptionStatus::PastDue,
            )
            .await?;
        }
        BillingEvent::Ignored => {}
    }
    Ok(())
}

async fn apply_snapshot(state: &AppState, snapshot: SubscriptionSnapshot) -> AppResult<()> {
    let agency_id = match snapshot.agency_id {
        Some(id) => Some(id),
        None => match snapshot.customer_id.as_deref() {
            Some(customer) => SubscriptionRepo::find_by_customer(&state.pool, customer)
                .await?
                .map(|s| s.agency_id),
            None => None,
        },
    };
    let Some(agency_id) = agency_id else {
        tracing::warn!(
            subscription_id = %snapshot.subscription_id,
            "Subscription event for an unknown agency"
        );
        return Ok(());
    };

    let plan = snapshot
        .price_id
        .as_deref()
        .and_then(|p| state.config.stripe.prices.plan_for_price(p));
    SubscriptionRepo::upsert(
        &state.pool,
        &UpsertSubscription {
            agency_id,
            stripe_customer_id: snapshot.customer_id,
            stripe_subscription_id: Some(snapshot.subscription_id),
            plan,
            status: snapshot.status,
            current_period_end: snapshot.current_period_end,
            cancel_at_period_end: Some(snapshot.cancel_at_period_end),
        },
    )
    .await?;

    if snapshot.status == SubscriptionStatus::Active && plan.is_some_and(Plan::is_paid) {
        convert_referrals(state, agency_id).await?;
    }
    Ok(())
}

async fn convert_referrals(state: &AppState, agency_id: DbId) -> AppResult<()> {
    let converted = ReferralRepo::convert_for_agency(&state.pool, agency_id).await?;
    if converted > 0 {
        tracing::info!(agency_id, converted, "Referrals converted");
    }
    Ok(())
}
