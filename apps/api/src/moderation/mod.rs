// Content moderation: a small state machine over the `content` table.
// Admin reviews and user reports both go through `review::apply_review`.

pub mod handlers;
pub mod repository;
pub mod review;
pub mod status;
