pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::analytics::handlers as analytics;
use crate::billing::handlers as billing;
use crate::careers::handlers as careers;
use crate::generation::handlers as blog;
use crate::moderation::handlers as moderation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Blog generation
        .route("/api/blog/generate", post(blog::handle_generate))
        .route("/api/blog", get(blog::handle_list_articles))
        .route("/api/blog/:slug", get(blog::handle_get_article))
        // Text analysis
        .route("/api/analyze", post(analysis::handle_analyze))
        // Billing
        .route("/api/paypal/webhook", post(billing::handle_paypal_webhook))
        .route(
            "/api/subscriptions",
            get(billing::handle_list_subscriptions).post(billing::handle_create_subscription),
        )
        .route(
            "/api/subscriptions/:id/cancel",
            post(billing::handle_cancel_subscription),
        )
        // Moderation
        .route(
            "/api/content/:id/report",
            post(moderation::handle_report_content),
        )
        .route("/api/admin/content", get(moderation::handle_list_content))
        .route(
            "/api/admin/content/:id/review",
            post(moderation::handle_review_content),
        )
        // Careers
        .route(
            "/api/careers/applications",
            post(careers::handle_submit_application),
        )
        .route(
            "/api/admin/applications",
            get(careers::handle_list_applications),
        )
        // Analytics
        .route("/api/admin/analytics", get(analytics::handle_analytics))
        .with_state(state)
}
