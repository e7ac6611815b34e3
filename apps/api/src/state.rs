use std::sync::Arc;

use crate::analysis::analyzer::AnalysisService;
use crate::analytics::repository::AnalyticsRepository;
use crate::billing::idempotency::IdempotencyStore;
use crate::billing::paypal_client::PaymentGateway;
use crate::billing::repository::SubscriptionRepository;
use crate::careers::repository::ApplicationRepository;
use crate::config::Config;
use crate::generation::images::ImageResolver;
use crate::generation::repository::ArticleRepository;
use crate::generation::resolver::ContentResolver;
use crate::generation::storage::ImageStore;
use crate::moderation::repository::ModerationRepository;

/// Shared application state injected into all route handlers via Axum extractors.
/// Stores and integrations are trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub articles: Arc<dyn ArticleRepository>,
    /// Text provider chain, in priority order.
    pub content_resolver: ContentResolver,
    pub image_resolver: ImageResolver,
    /// S3 when a bucket is configured, inline `data:` URLs otherwise.
    pub image_store: Arc<dyn ImageStore>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    /// Seen webhook event ids; the only process-wide mutable state.
    pub idempotency: Arc<dyn IdempotencyStore>,
    /// `None` when PayPal credentials are not configured.
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub moderation: Arc<dyn ModerationRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub analytics: Arc<dyn AnalyticsRepository>,
    pub analysis: AnalysisService,
}
