// Subscription billing through PayPal.
// Webhooks pass the idempotency gate, are decoded into `PaypalEvent`, planned
// by `transitions` as a pure function and applied by `updater`.

pub mod events;
pub mod handlers;
pub mod idempotency;
pub mod paypal_client;
pub mod repository;
pub mod status;
pub mod transitions;
pub mod updater;
