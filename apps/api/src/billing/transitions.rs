//! Event → subscription change, as a pure function of the event and the clock.
//!
//! | Event               | Status                      | expires_at              |
//! |---------------------|-----------------------------|-------------------------|
//! | CREATED / ACTIVATED | active                      | next billing time, if any |
//! | CANCELLED           | cancelled                   | now                     |
//! | EXPIRED             | expired                     | unchanged               |
//! | SUSPENDED           | suspended                   | unchanged               |
//! | PAYMENT.FAILED      | past_due                    | unchanged               |
//! | UPDATED             | mapped from resource status | next billing time       |
//! | PAYMENT.COMPLETED   | unchanged                   | unchanged (payment row) |

use chrono::{DateTime, Utc};

use crate::billing::events::{PaypalEvent, SaleResource};
use crate::billing::status::SubscriptionStatus;

/// Field updates to apply to one subscription row. `None` leaves a column as is.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionChange {
    pub status: Option<SubscriptionStatus>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionChange {
    pub fn is_noop(&self) -> bool {
        self.status.is_none() && self.expires_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub enum Transition {
    Update(SubscriptionChange),
    RecordPayment(SaleResource),
    Ignore,
}

pub fn plan_transition(event: &PaypalEvent, now: DateTime<Utc>) -> Transition {
    let change = |status: Option<SubscriptionStatus>, expires_at: Option<DateTime<Utc>>| {
        Transition::Update(SubscriptionChange { status, expires_at })
    };

    match event {
        PaypalEvent::SubscriptionCreated(r) | PaypalEvent::SubscriptionActivated(r) => {
            change(Some(SubscriptionStatus::Active), r.next_billing_time())
        }
        PaypalEvent::SubscriptionCancelled(_) => {
            change(Some(SubscriptionStatus::Cancelled), Some(now))
        }
        PaypalEvent::SubscriptionExpired(_) => change(Some(SubscriptionStatus::Expired), None),
        PaypalEvent::SubscriptionSuspended(_) => change(Some(SubscriptionStatus::Suspended), None),
        PaypalEvent::SubscriptionPaymentFailed(_) => change(Some(SubscriptionStatus::PastDue), None),
        PaypalEvent::SubscriptionUpdated(r) => {
            let status = r.status.as_deref().and_then(SubscriptionStatus::from_paypal);
            let change = SubscriptionChange {
                status,
                expires_at: r.next_billing_time(),
            };
            if change.is_noop() {
                Transition::Ignore
            } else {
                Transition::Update(change)
            }
        }
        PaypalEvent::PaymentCompleted(sale) => Transition::RecordPayment(sale.clone()),
        PaypalEvent::Unhandled { .. } => Transition::Ignore,
    }
}
