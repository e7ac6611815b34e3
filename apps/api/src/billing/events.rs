//! PayPal webhook payloads.
//!
//! The raw envelope carries an untyped `resource`; `PaypalEvent` decodes it
//! into one variant per handled event type, plus `Unhandled` for the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("Invalid {event_type} resource: {source}")]
    InvalidResource {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Webhook envelope as delivered by PayPal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Unique event id (`WH-...`); the idempotency key.
    pub id: String,
    pub event_type: String,
    #[serde(default)]
    pub resource: serde_json::Value,
}

/// Event types with a dedicated handler; everything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaypalEventType {
    SubscriptionCreated,
    SubscriptionActivated,
    SubscriptionUpdated,
    SubscriptionCancelled,
    SubscriptionExpired,
    SubscriptionSuspended,
    SubscriptionPaymentFailed,
    PaymentCompleted,
    Unknown,
}

impl PaypalEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "BILLING.SUBSCRIPTION.CREATED" => Self::SubscriptionCreated,
            "BILLING.SUBSCRIPTION.ACTIVATED" => Self::SubscriptionActivated,
            "BILLING.SUBSCRIPTION.UPDATED" => Self::SubscriptionUpdated,
            "BILLING.SUBSCRIPTION.CANCELLED" => Self::SubscriptionCancelled,
            "BILLING.SUBSCRIPTION.EXPIRED" => Self::SubscriptionExpired,
            "BILLING.SUBSCRIPTION.SUSPENDED" => Self::SubscriptionSuspended,
            "BILLING.SUBSCRIPTION.PAYMENT.FAILED" => Self::SubscriptionPaymentFailed,
            "PAYMENT.SALE.COMPLETED" => Self::PaymentCompleted,
            _ => Self::Unknown,
        }
    }

    fn is_subscription_event(&self) -> bool {
        !matches!(self, Self::PaymentCompleted | Self::Unknown)
    }
}

/// `resource` of `BILLING.SUBSCRIPTION.*` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResource {
    /// PayPal subscription id (`I-...`).
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub billing_info: Option<BillingInfo>,
}

impl SubscriptionResource {
    pub fn next_billing_time(&self) -> Option<DateTime<Utc>> {
        self.billing_info.as_ref().and_then(|b| b.next_billing_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingInfo {
    #[serde(default)]
    pub next_billing_time: Option<DateTime<Utc>>,
}

/// `resource` of `PAYMENT.SALE.COMPLETED`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleResource {
    /// Sale (transaction) id.
    pub id: String,
    pub amount: SaleAmount,
    /// The subscription the sale belongs to.
    #[serde(default)]
    pub billing_agreement_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleAmount {
    /// Decimal string, e.g. `"9.99"`.
    pub total: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub enum PaypalEvent {
    SubscriptionCreated(SubscriptionResource),
    SubscriptionActivated(SubscriptionResource),
    SubscriptionUpdated(SubscriptionResource),
    SubscriptionCancelled(SubscriptionResource),
    SubscriptionExpired(SubscriptionResource),
    SubscriptionSuspended(SubscriptionResource),
    SubscriptionPaymentFailed(SubscriptionResource),
    PaymentCompleted(SaleResource),
    Unhandled { event_type: String },
}

impl PaypalEvent {
    pub fn from_envelope(envelope: &WebhookEnvelope) -> Result<Self, EventParseError> {
        let event_type = PaypalEventType::parse(&envelope.event_type);
        let invalid = |source| EventParseError::InvalidResource {
            event_type: envelope.event_type.clone(),
            source,
        };

        if event_type.is_subscription_event() {
            let resource: SubscriptionResource =
                serde_json::from_value(envelope.resource.clone()).map_err(invalid)?;
            return Ok(match event_type {
                PaypalEventType::SubscriptionCreated => Self::SubscriptionCreated(resource),
                PaypalEventType::SubscriptionActivated => Self::SubscriptionActivated(resource),
                PaypalEventType::SubscriptionUpdated => Self::SubscriptionUpdated(resource),
                PaypalEventType::SubscriptionCancelled => Self::SubscriptionCancelled(resource),
                PaypalEventType::SubscriptionExpired => Self::SubscriptionExpired(resource),
                PaypalEventType::SubscriptionSuspended => Self::SubscriptionSuspended(resource),
                _ => Self::SubscriptionPaymentFailed(resource),
            });
        }

        match event_type {
            PaypalEventType::PaymentCompleted => {
                let sale: SaleResource =
                    serde_json::from_value(envelope.resource.clone()).map_err(invalid)?;
                Ok(Self::PaymentCompleted(sale))
            }
            _ => Ok(Self::Unhandled {
                event_type: envelope.event_type.clone(),
            }),
        }
    }

    /// The provider-side id used to find the local subscription row.
    pub fn subscription_ref(&self) -> Option<&str> {
        match self {
            Self::SubscriptionCreated(r)
            | Self::SubscriptionActivated(r)
            | Self::SubscriptionUpdated(r)
            | Self::SubscriptionCancelled(r)
            | Self::SubscriptionExpired(r)
            | Self::SubscriptionSuspended(r)
            | Self::SubscriptionPaymentFailed(r) => Some(r.id.as_str()),
            Self::PaymentCompleted(sale) => sale.billing_agreement_id.as_deref(),
            Self::Unhandled { .. } => None,
        }
    }
}

/// Parses a PayPal decimal amount ("9.99", "10", "0.5") into minor units.
pub fn parse_amount_cents(total: &str) -> Option<i64> {
    let total = total.trim();
    let (negative, digits) = match total.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, total),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > 2 || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let value = whole.checked_mul(100)?.checked_add(cents)?;
    Some(if negative { -value } else { value })
}
