use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row in `subscriptions`. `status` holds `SubscriptionStatus::as_str()`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub paypal_subscription_id: Option<String>,
    /// Legacy identifier from one-off checkouts; webhook lookups also match on it.
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub plan_type: String,
    pub status: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub paypal_subscription_id: String,
}

/// Append-only audit row in `payment_history`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransactionRow {
    pub id: Uuid,
    pub transaction_id: String,
    /// Minor units (cents).
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub subscription_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub transaction_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub subscription_id: Uuid,
    pub user_id: Uuid,
}
