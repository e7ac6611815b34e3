//! Axum route handlers for PayPal webhooks and the subscription API.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::billing::events::{PaypalEvent, WebhookEnvelope};
use crate::billing::paypal_client::{is_valid_subscription_id, PaymentGateway};
use crate::billing::status::SubscriptionStatus;
use crate::billing::transitions::SubscriptionChange;
use crate::billing::updater::apply_event;
use crate::errors::AppError;
use crate::models::billing::{NewSubscription, SubscriptionRow};
use crate::state::AppState;

const DEFAULT_CANCEL_REASON: &str = "Cancelled by user";

// ────────────────────────────────────────────────────────────────────────────
// Webhook
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    fn ok() -> Self {
        Self {
            received: true,
            ..Self::default()
        }
    }

    fn duplicate() -> Self {
        Self {
            duplicate: Some(true),
            ..Self::ok()
        }
    }

    fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::ok()
        }
    }
}

/// POST /api/paypal/webhook
///
/// Always answers 200 so PayPal does not retry; failures are only logged.
/// The event id is marked as seen on receipt, before processing.
pub async fn handle_paypal_webhook(State(state): State<AppState>, body: Bytes) -> Json<WebhookAck> {
    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            error!("Unreadable PayPal webhook payload: {e}");
            return Json(WebhookAck::failed("Invalid payload".to_string()));
        }
    };

    info!(
        "Received PayPal webhook event: {} ({})",
        envelope.event_type, envelope.id
    );

    if state.idempotency.check_and_mark(&envelope.id).await {
        info!("Skipping duplicate PayPal event {}", envelope.id);
        return Json(WebhookAck::duplicate());
    }

    let event = match PaypalEvent::from_envelope(&envelope) {
        Ok(event) => event,
        Err(e) => {
            error!("Failed to decode PayPal event {}: {e}", envelope.id);
            return Json(WebhookAck::failed(format!("Processing failed: {e}")));
        }
    };

    match apply_event(state.subscriptions.as_ref(), &event, Utc::now()).await {
        Ok(outcome) => {
            info!("Processed PayPal event {}: {outcome:?}", envelope.id);
            Json(WebhookAck::ok())
        }
        Err(e) => {
            error!("Failed to process PayPal event {}: {e:#}", envelope.id);
            Json(WebhookAck::failed(format!("Processing failed: {e}")))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Subscriptions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub user_id: Uuid,
    pub plan_type: String,
    pub paypal_subscription_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelSubscriptionRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscriptionsQuery {
    pub user_id: Uuid,
}

fn payment_gateway(state: &AppState) -> Result<Arc<dyn PaymentGateway>, AppError> {
    state
        .payments
        .clone()
        .ok_or_else(|| AppError::Internal(anyhow!("payment provider not configured")))
}

/// POST /api/subscriptions
///
/// Verifies the approved PayPal subscription and stores it as active.
pub async fn handle_create_subscription(
    State(state): State<AppState>,
    Json(req): Json<CreateSubscriptionRequest>,
) -> Result<Json<SubscriptionRow>, AppError> {
    let plan_type = req.plan_type.trim();
    let paypal_id = req.paypal_subscription_id.trim();
    if plan_type.is_empty() {
        return Err(AppError::Validation("planType is required".to_string()));
    }
    if paypal_id.is_empty() {
        return Err(AppError::Validation(
            "paypalSubscriptionId is required".to_string(),
        ));
    }
    if !is_valid_subscription_id(paypal_id) {
        return Err(AppError::Validation(format!(
            "paypalSubscriptionId '{paypal_id}' is not a PayPal subscription id"
        )));
    }

    let gateway = payment_gateway(&state)?;

    if let Some(existing) = state.subscriptions.find_by_provider_ref(paypal_id).await? {
        if existing.paypal_subscription_id.as_deref() == Some(paypal_id) {
            return Err(AppError::Conflict(format!(
                "Subscription {paypal_id} is already registered"
            )));
        }
    }

    let remote = gateway
        .get_subscription(paypal_id)
        .await
        .map_err(|e| AppError::Provider(e.to_string()))?;

    let remote_status = remote.status.as_deref().unwrap_or_default();
    if SubscriptionStatus::from_paypal(remote_status) != Some(SubscriptionStatus::Active) {
        return Err(AppError::Validation(format!(
            "PayPal subscription {paypal_id} is not active (status '{remote_status}')"
        )));
    }

    let row = state
        .subscriptions
        .insert(NewSubscription {
            user_id: req.user_id,
            plan_type: plan_type.to_string(),
            status: SubscriptionStatus::Active.as_str().to_string(),
            expires_at: remote.next_billing_time(),
            paypal_subscription_id: paypal_id.to_string(),
        })
        .await?;

    info!(
        "User {} subscribed to {} ({})",
        row.user_id, row.plan_type, paypal_id
    );
    Ok(Json(row))
}

/// POST /api/subscriptions/:id/cancel
pub async fn handle_cancel_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelSubscriptionRequest>>,
) -> Result<Json<SubscriptionRow>, AppError> {
    let gateway = payment_gateway(&state)?;
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let subscription = state
        .subscriptions
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subscription {id} not found")))?;

    if subscription.status == SubscriptionStatus::Cancelled.as_str() {
        return Err(AppError::Conflict(format!(
            "Subscription {id} is already cancelled"
        )));
    }
    let paypal_id = subscription.paypal_subscription_id.as_deref().ok_or_else(|| {
        AppError::Validation(format!("Subscription {id} has no PayPal subscription"))
    })?;

    let reason = req
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CANCEL_REASON);
    gateway
        .cancel_subscription(paypal_id, reason)
        .await
        .map_err(|e| AppError::Provider(e.to_string()))?;

    let change = SubscriptionChange {
        status: Some(SubscriptionStatus::Cancelled),
        expires_at: Some(Utc::now()),
    };
    let updated = state
        .subscriptions
        .apply_change(id, &change)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subscription {id} not found")))?;

    info!("Subscription {id} cancelled: {reason}");
    Ok(Json(updated))
}

/// GET /api/subscriptions?userId=
pub async fn handle_list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<UserSubscriptionsQuery>,
) -> Result<Json<Vec<SubscriptionRow>>, AppError> {
    Ok(Json(state.subscriptions.list_for_user(params.user_id).await?))
}
