//! Webhook event decoding.
//!
//! Only the fields the subscription mirror needs are deserialized; every
//! other event type decodes to [`BillingEvent::Ignored`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use vurp_core::billing::SubscriptionStatus;
use vurp_core::error::CoreError;
use vurp_core::types::{DbId, Timestamp};

/// Envelope shared by every webhook event.
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    client_reference_id: Option<String>,
    customer: Option<String>,
    subscription: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: Option<String>,
    status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    items: Option<ItemList>,
    current_period_end: Option<i64>,
    #[serde(default)]
    cancel_at_period_end: bool,
}

#[derive(Debug, Deserialize)]
struct ItemList {
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    price: Price,
    current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Price {
    id: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceObject {
    subscription: Option<String>,
}

/// State of a processor subscription as carried by an event.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSnapshot {
    pub subscription_id: String,
    pub customer_id: Option<String>,
    /// Agency from subscription metadata, when the checkout set it.
    pub agency_id: Option<DbId>,
    pub price_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
}

/// The subset of webhook events that change local state.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    CheckoutCompleted {
        agency_id: Option<DbId>,
        customer_id: Option<String>,
        subscription_id: Option<String>,
        price_id: Option<String>,
    },
    SubscriptionChanged(SubscriptionSnapshot),
    SubscriptionDeleted {
        subscription_id: String,
    },
    PaymentFailed {
        subscription_id: String,
    },
    Ignored,
}

fn parse_agency_id(raw: Option<&String>) -> Option<DbId> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn from_unix(secs: i64) -> Option<Timestamp> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

fn decode<T: for<'de> Deserialize<'de>>(event: &StripeEvent) -> Result<T, CoreError> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        CoreError::Validation(format!("Malformed {} payload: {e}", event.event_type))
    })
}

impl BillingEvent {
    pub fn from_event(event: &StripeEvent) -> Result<Self, CoreError> {
        match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject = decode(event)?;
                let agency_id = parse_agency_id(session.client_reference_id.as_ref())
                    .or_else(|| parse_agency_id(session.metadata.get("agency_id")));
                Ok(BillingEvent::CheckoutCompleted {
                    agency_id,
                    customer_id: session.customer,
                    subscription_id: session.subscription,
                    price_id: session.metadata.get("price_id").cloned(),
                })
            }
            "customer.subscription.created" | "customer.subscription.updated" => {
                let sub: SubscriptionObject = decode(event)?;
                let first_item = sub.items.as_ref().and_then(|items| items.data.first());
                let period_end = sub
                    .current_period_end
                    .or_else(|| first_item.and_then(|item| item.current_period_end))
                    .and_then(from_unix);
                Ok(BillingEvent::SubscriptionChanged(SubscriptionSnapshot {
                    agency_id: parse_agency_id(sub.metadata.get("agency_id")),
                    price_id: first_item.map(|item| item.price.id.clone()),
                    status: SubscriptionStatus::from_processor(&sub.status),
                    current_period_end: period_end,
                    cancel_at_period_end: sub.cancel_at_period_end,
                    customer_id: sub.customer,
                    subscription_id: sub.id,
                }))
            }
            "customer.subscription.deleted" => {
                let sub: SubscriptionObject = decode(event)?;
                Ok(BillingEvent::SubscriptionDeleted {
                    subscription_id: sub.id,
                })
            }
            "invoice.payment_failed" => {
                let invoice: InvoiceObject = decode(event)?;
                Ok(match invoice.subscription {
                    Some(subscription_id) => BillingEvent::PaymentFailed { subscription_id },
                    None => BillingEvent::Ignored,
                })
            }
            _ => Ok(BillingEvent::Ignored),
        }
    }
}
