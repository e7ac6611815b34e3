use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::billing::transitions::SubscriptionChange;
use crate::models::billing::{
    NewPayment, NewSubscription, PaymentTransactionRow, SubscriptionRow,
};

/// Persistence for `subscriptions` and `payment_history`.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Row whose `paypal_subscription_id` or `payment_id` equals `reference`.
    /// A `paypal_subscription_id` match wins over a `payment_id` match.
    async fn find_by_provider_ref(&self, reference: &str) -> Result<Option<SubscriptionRow>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SubscriptionRow>>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionRow>>;

    async fn insert(&self, subscription: NewSubscription) -> Result<SubscriptionRow>;

    /// Single-row update; `None` fields are left untouched.
    async fn apply_change(
        &self,
        id: Uuid,
        change: &SubscriptionChange,
    ) -> Result<Option<SubscriptionRow>>;

    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentTransactionRow>;
}

#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_provider_ref(&self, reference: &str) -> Result<Option<SubscriptionRow>> {
        Ok(sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT * FROM subscriptions
            WHERE paypal_subscription_id = $1 OR payment_id = $1
            ORDER BY (paypal_subscription_id IS NOT DISTINCT FROM $1) DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SubscriptionRow>> {
        Ok(
            sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM subscriptions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionRow>> {
        Ok(sqlx::query_as::<_, SubscriptionRow>(
            "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert(&self, subscription: NewSubscription) -> Result<SubscriptionRow> {
        Ok(sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions
                (user_id, plan_type, status, started_at, expires_at, paypal_subscription_id)
            VALUES ($1, $2, $3, NOW(), $4, $5)
            RETURNING *
            "#,
        )
        .bind(subscription.user_id)
        .bind(&subscription.plan_type)
        .bind(&subscription.status)
        .bind(subscription.expires_at)
        .bind(&subscription.paypal_subscription_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn apply_change(
        &self,
        id: Uuid,
        change: &SubscriptionChange,
    ) -> Result<Option<SubscriptionRow>> {
        Ok(sqlx::query_as::<_, SubscriptionRow>(
            r#"
            UPDATE subscriptions
            SET status = COALESCE($2, status),
                expires_at = COALESCE($3, expires_at)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(change.status.map(|s| s.as_str()))
        .bind(change.expires_at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentTransactionRow> {
        Ok(sqlx::query_as::<_, PaymentTransactionRow>(
            r#"
            INSERT INTO payment_history
                (transaction_id, amount_cents, currency, status, subscription_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payment.transaction_id)
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(&payment.status)
        .bind(payment.subscription_id)
        .bind(payment.user_id)
        .fetch_one(&self.pool)
        .await?)
    }
}
