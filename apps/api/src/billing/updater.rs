//! Applies decoded webhook events to local subscription rows.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::billing::events::{parse_amount_cents, PaypalEvent, SaleResource};
use crate::billing::repository::SubscriptionRepository;
use crate::billing::transitions::{plan_transition, Transition};
use crate::models::billing::{NewPayment, PaymentTransactionRow, SubscriptionRow};

const DEFAULT_SALE_STATE: &str = "completed";

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(SubscriptionRow),
    PaymentRecorded(PaymentTransactionRow),
    /// No local subscription matched; the event is dropped.
    NoMatch,
    Ignored,
}

pub async fn apply_event(
    subscriptions: &dyn SubscriptionRepository,
    event: &PaypalEvent,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome> {
    let transition = plan_transition(event, now);
    if matches!(transition, Transition::Ignore) {
        debug!("No subscription change for {event:?}");
        return Ok(UpdateOutcome::Ignored);
    }

    let Some(reference) = event.subscription_ref() else {
        warn!("Event carries no subscription reference, dropping");
        return Ok(UpdateOutcome::NoMatch);
    };
    let Some(subscription) = subscriptions.find_by_provider_ref(reference).await? else {
        warn!("No local subscription for PayPal reference {reference}, dropping event");
        return Ok(UpdateOutcome::NoMatch);
    };

    match transition {
        Transition::Update(change) => {
            let Some(updated) = subscriptions.apply_change(subscription.id, &change).await? else {
                warn!("Subscription {} vanished before update", subscription.id);
                return Ok(UpdateOutcome::NoMatch);
            };
            info!(
                "Subscription {} now {} (expires {:?})",
                updated.id, updated.status, updated.expires_at
            );
            Ok(UpdateOutcome::Updated(updated))
        }
        Transition::RecordPayment(sale) => {
            let payment = record_sale(subscriptions, &subscription, &sale).await?;
            info!(
                "Recorded payment {} of {} {} for subscription {}",
                payment.transaction_id, payment.amount_cents, payment.currency, subscription.id
            );
            Ok(UpdateOutcome::PaymentRecorded(payment))
        }
        Transition::Ignore => Ok(UpdateOutcome::Ignored),
    }
}

async fn record_sale(
    subscriptions: &dyn SubscriptionRepository,
    subscription: &SubscriptionRow,
    sale: &SaleResource,
) -> Result<PaymentTransactionRow> {
    let amount_cents = parse_amount_cents(&sale.amount.total)
        .ok_or_else(|| anyhow!("Unparseable sale amount '{}'", sale.amount.total))?;

    subscriptions
        .record_payment(NewPayment {
            transaction_id: sale.id.clone(),
            amount_cents,
            currency: sale.amount.currency.clone(),
            status: sale
                .state
                .clone()
                .unwrap_or_else(|| DEFAULT_SALE_STATE.to_string()),
            subscription_id: subscription.id,
            user_id: subscription.user_id,
        })
        .await
}
