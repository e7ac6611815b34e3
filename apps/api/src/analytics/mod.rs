// Admin analytics: read-only aggregates over articles, subscriptions and payments.

pub mod handlers;
pub mod report;
pub mod repository;
