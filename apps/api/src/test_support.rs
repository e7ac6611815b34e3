//! In-memory stores and stub providers for unit and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::analysis::analyzer::AnalysisService;
use crate::analytics::repository::{
    AnalyticsRepository, ArticleTotals, CurrencyRevenue, StatusCount, TopArticle,
};
use crate::billing::events::{BillingInfo, SubscriptionResource};
use crate::billing::idempotency::InMemoryIdempotencyStore;
use crate::billing::paypal_client::{PaymentGateway, PaypalError};
use crate::billing::repository::SubscriptionRepository;
use crate::billing::transitions::SubscriptionChange;
use crate::careers::repository::{ApplicationRepository, RECEIVED_STATUS};
use crate::config::Config;
use crate::generation::images::{ImageData, ImageError, ImageModel, ImageResolver};
use crate::generation::repository::ArticleRepository;
use crate::generation::resolver::ContentResolver;
use crate::generation::slug::create_slug;
use crate::generation::storage::InlineImageStore;
use crate::llm_client::{LlmError, TextProvider};
use crate::models::application::{ApplicationRow, NewApplication};
use crate::models::article::{ArticleRow, NewArticle};
use crate::models::billing::{
    NewPayment, NewSubscription, PaymentTransactionRow, SubscriptionRow,
};
use crate::models::content::{ContentRow, ModerationUpdate};
use crate::moderation::repository::ModerationRepository;
use crate::moderation::status::ModerationStatus;
use crate::state::AppState;

pub const ADMIN_TOKEN: &str = "test-admin-token";

// ────────────────────────────────────────────────────────────────────────────
// Providers
// ────────────────────────────────────────────────────────────────────────────

pub struct StubTextProvider {
    name: String,
    reply: Option<String>,
    calls: AtomicUsize,
}

impl StubTextProvider {
    pub fn ok(name: &str, reply: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProvider for StubTextProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: format!("{} is down", self.name),
        })
    }
}

pub struct StubImageModel {
    name: String,
    works: bool,
    calls: AtomicUsize,
}

impl StubImageModel {
    pub fn ok(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            works: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            works: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageModel for StubImageModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _prompt: &str) -> Result<ImageData, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.works {
            return Err(ImageError::Api {
                status: 503,
                message: "model is loading".to_string(),
            });
        }
        Ok(ImageData {
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\nstub"),
            content_type: "image/png".to_string(),
        })
    }
}

/// PayPal stand-in. Reports every subscription with the configured status.
pub struct StubPaymentGateway {
    status: String,
    next_billing_time: Option<DateTime<Utc>>,
    down: bool,
    cancelled: Mutex<Vec<String>>,
}

impl StubPaymentGateway {
    pub fn with_status(status: &str, next_billing_time: Option<DateTime<Utc>>) -> Arc<Self> {
        Arc::new(Self {
            status: status.to_string(),
            next_billing_time,
            down: false,
            cancelled: Mutex::new(Vec::new()),
        })
    }

    pub fn down() -> Arc<Self> {
        Arc::new(Self {
            status: String::new(),
            next_billing_time: None,
            down: true,
            cancelled: Mutex::new(Vec::new()),
        })
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().clone()
    }

    fn check_up(&self) -> Result<(), PaypalError> {
        if self.down {
            return Err(PaypalError::Api {
                status: 500,
                message: "INTERNAL_SERVICE_ERROR".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionResource, PaypalError> {
        self.check_up()?;
        Ok(SubscriptionResource {
            id: subscription_id.to_string(),
            status: Some(self.status.clone()),
            plan_id: Some("P-TEST".to_string()),
            custom_id: None,
            billing_info: Some(BillingInfo {
                next_billing_time: self.next_billing_time,
            }),
        })
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        _reason: &str,
    ) -> Result<(), PaypalError> {
        self.check_up()?;
        self.cancelled.lock().push(subscription_id.to_string());
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stores
// ────────────────────────────────────────────────────────────────────────────

fn unavailable() -> anyhow::Error {
    anyhow!("database unavailable")
}

#[derive(Default)]
pub struct InMemoryArticleRepository {
    rows: Mutex<Vec<ArticleRow>>,
    failing: bool,
}

impl InMemoryArticleRepository {
    pub fn failing() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn find_existing(&self, query: &str) -> Result<Option<ArticleRow>> {
        self.check()?;
        let slug = create_slug(query);
        let needle = query.trim().to_lowercase();
        Ok(self
            .rows
            .lock()
            .iter()
            .rev()
            .find(|a| a.is_published && (a.slug == slug || a.title.to_lowercase().contains(&needle)))
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        self.check()?;
        Ok(self.rows.lock().iter().any(|a| a.slug == slug))
    }

    async fn insert(&self, article: NewArticle) -> Result<ArticleRow> {
        self.check()?;
        let row = ArticleRow {
            id: Uuid::new_v4(),
            title: article.title,
            slug: article.slug,
            content: article.content,
            excerpt: article.excerpt,
            tags: article.tags,
            read_time: article.read_time,
            ai_provider: article.ai_provider,
            image_url: article.image_url,
            view_count: 0,
            is_published: true,
            created_at: Utc::now(),
        };
        self.rows.lock().push(row.clone());
        Ok(row)
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<ArticleRow>> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .iter()
            .rev()
            .filter(|a| a.is_published)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn view_by_slug(&self, slug: &str) -> Result<Option<ArticleRow>> {
        self.check()?;
        let mut rows = self.rows.lock();
        Ok(rows
            .iter_mut()
            .find(|a| a.slug == slug && a.is_published)
            .map(|a| {
                a.view_count += 1;
                a.clone()
            }))
    }
}

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<Vec<SubscriptionRow>>,
    payments: Mutex<Vec<PaymentTransactionRow>>,
}

impl InMemorySubscriptionRepository {
    fn seed(
        &self,
        paypal_subscription_id: Option<&str>,
        payment_id: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> SubscriptionRow {
        let now = Utc::now();
        let row = SubscriptionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_type: "pro".to_string(),
            status: "active".to_string(),
            started_at: now,
            expires_at,
            paypal_subscription_id: paypal_subscription_id.map(str::to_string),
            payment_id: payment_id.map(str::to_string),
            created_at: now,
        };
        self.rows.lock().push(row.clone());
        row
    }

    pub fn seed_active(
        &self,
        paypal_subscription_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> SubscriptionRow {
        self.seed(Some(paypal_subscription_id), None, expires_at)
    }

    pub fn seed_with_payment_id(&self, payment_id: &str) -> SubscriptionRow {
        self.seed(None, Some(payment_id), None)
    }

    pub fn rows(&self) -> Vec<SubscriptionRow> {
        self.rows.lock().clone()
    }

    pub fn payments(&self) -> Vec<PaymentTransactionRow> {
        self.payments.lock().clone()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_provider_ref(&self, reference: &str) -> Result<Option<SubscriptionRow>> {
        let rows = self.rows.lock();
        let by_subscription = rows
            .iter()
            .rev()
            .find(|r| r.paypal_subscription_id.as_deref() == Some(reference));
        let by_payment = || {
            rows.iter()
                .rev()
                .find(|r| r.payment_id.as_deref() == Some(reference))
        };
        Ok(by_subscription.or_else(by_payment).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SubscriptionRow>> {
        Ok(self.rows.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionRow>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, subscription: NewSubscription) -> Result<SubscriptionRow> {
        let now = Utc::now();
        let row = SubscriptionRow {
            id: Uuid::new_v4(),
            user_id: subscription.user_id,
            plan_type: subscription.plan_type,
            status: subscription.status,
            started_at: now,
            expires_at: subscription.expires_at,
            paypal_subscription_id: Some(subscription.paypal_subscription_id),
            payment_id: None,
            created_at: now,
        };
        self.rows.lock().push(row.clone());
        Ok(row)
    }

    async fn apply_change(
        &self,
        id: Uuid,
        change: &SubscriptionChange,
    ) -> Result<Option<SubscriptionRow>> {
        let mut rows = self.rows.lock();
        Ok(rows.iter_mut().find(|r| r.id == id).map(|row| {
            if let Some(status) = change.status {
                row.status = status.as_str().to_string();
            }
            if let Some(expires_at) = change.expires_at {
                row.expires_at = Some(expires_at);
            }
            row.clone()
        }))
    }

    async fn record_payment(&self, payment: NewPayment) -> Result<PaymentTransactionRow> {
        let row = PaymentTransactionRow {
            id: Uuid::new_v4(),
            transaction_id: payment.transaction_id,
            amount_cents: payment.amount_cents,
            currency: payment.currency,
            status: payment.status,
            subscription_id: payment.subscription_id,
            user_id: payment.user_id,
            created_at: Utc::now(),
        };
        self.payments.lock().push(row.clone());
        Ok(row)
    }
}

#[derive(Default)]
pub struct InMemoryModerationRepository {
    rows: Mutex<Vec<ContentRow>>,
}

impl InMemoryModerationRepository {
    pub fn seed(&self, status: ModerationStatus) -> ContentRow {
        let row = ContentRow {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            title: "Ten Docker tips".to_string(),
            body: "Use multi-stage builds.".to_string(),
            moderation_status: status.as_str().to_string(),
            flag_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };
        self.rows.lock().push(row.clone());
        row
    }

    pub fn get(&self, id: Uuid) -> Option<ContentRow> {
        self.rows.lock().iter().find(|r| r.id == id).cloned()
    }
}

#[async_trait]
impl ModerationRepository for InMemoryModerationRepository {
    async fn list(&self, status: Option<ModerationStatus>, limit: i64) -> Result<Vec<ContentRow>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .rev()
            .filter(|r| status.map_or(true, |s| r.moderation_status == s.as_str()))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentRow>> {
        Ok(self.get(id))
    }

    async fn update_moderation(
        &self,
        id: Uuid,
        update: &ModerationUpdate,
    ) -> Result<Option<ContentRow>> {
        let mut rows = self.rows.lock();
        Ok(rows.iter_mut().find(|r| r.id == id).map(|row| {
            row.moderation_status = update.status.clone();
            row.flag_reason = update.flag_reason.clone();
            row.reviewed_by = update.reviewed_by.clone();
            row.reviewed_at = Some(update.reviewed_at);
            row.clone()
        }))
    }
}

#[derive(Default)]
pub struct InMemoryApplicationRepository {
    rows: Mutex<Vec<ApplicationRow>>,
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn insert(&self, application: NewApplication) -> Result<ApplicationRow> {
        let row = ApplicationRow {
            id: Uuid::new_v4(),
            full_name: application.full_name,
            email: application.email,
            position: application.position,
            resume_url: application.resume_url,
            cover_letter: application.cover_letter,
            status: RECEIVED_STATUS.to_string(),
            created_at: Utc::now(),
        };
        self.rows.lock().push(row.clone());
        Ok(row)
    }

    async fn list(&self, limit: i64) -> Result<Vec<ApplicationRow>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

/// Aggregates over the in-memory article and subscription stores.
pub struct InMemoryAnalyticsRepository {
    articles: Arc<InMemoryArticleRepository>,
    subscriptions: Arc<InMemorySubscriptionRepository>,
}

#[async_trait]
impl AnalyticsRepository for InMemoryAnalyticsRepository {
    async fn article_totals(&self) -> Result<ArticleTotals> {
        self.articles.check()?;
        let rows = self.articles.rows.lock();
        Ok(ArticleTotals {
            total: rows.len() as i64,
            published: rows.iter().filter(|a| a.is_published).count() as i64,
            total_views: rows.iter().map(|a| a.view_count).sum(),
        })
    }

    async fn top_articles(&self, limit: i64) -> Result<Vec<TopArticle>> {
        self.articles.check()?;
        let mut rows: Vec<ArticleRow> = self
            .articles
            .rows
            .lock()
            .iter()
            .filter(|a| a.is_published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        Ok(rows
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|a| TopArticle {
                title: a.title,
                slug: a.slug,
                view_count: a.view_count,
            })
            .collect())
    }

    async fn subscription_counts(&self) -> Result<Vec<StatusCount>> {
        let mut counts: Vec<StatusCount> = Vec::new();
        for row in self.subscriptions.rows() {
            match counts.iter_mut().find(|c| c.status == row.status) {
                Some(count) => count.count += 1,
                None => counts.push(StatusCount {
                    status: row.status,
                    count: 1,
                }),
            }
        }
        Ok(counts)
    }

    async fn revenue_by_currency(&self) -> Result<Vec<CurrencyRevenue>> {
        let mut revenue: Vec<CurrencyRevenue> = Vec::new();
        for payment in self.subscriptions.payments() {
            match revenue.iter_mut().find(|r| r.currency == payment.currency) {
                Some(total) => {
                    total.amount_cents += payment.amount_cents;
                    total.payments += 1;
                }
                None => revenue.push(CurrencyRevenue {
                    currency: payment.currency,
                    amount_cents: payment.amount_cents,
                    payments: 1,
                }),
            }
        }
        revenue.sort_by(|a, b| a.currency.cmp(&b.currency));
        Ok(revenue)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// State builder
// ────────────────────────────────────────────────────────────────────────────

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/unused".to_string(),
        redis_url: None,
        groq_api_key: None,
        gemini_api_key: None,
        hugging_face_api_key: None,
        paypal: None,
        storage: None,
        admin_api_token: ADMIN_TOKEN.to_string(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Builds an `AppState` over in-memory stores. With no providers configured,
/// generation falls through to the local template and no image is attached.
pub struct TestStateBuilder {
    text_providers: Vec<Arc<dyn TextProvider>>,
    image_models: Vec<Arc<dyn ImageModel>>,
    articles: Arc<InMemoryArticleRepository>,
    subscriptions: Arc<InMemorySubscriptionRepository>,
    moderation: Arc<InMemoryModerationRepository>,
    payments: Option<Arc<dyn PaymentGateway>>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            text_providers: Vec::new(),
            image_models: Vec::new(),
            articles: Arc::new(InMemoryArticleRepository::default()),
            subscriptions: Arc::new(InMemorySubscriptionRepository::default()),
            moderation: Arc::new(InMemoryModerationRepository::default()),
            payments: None,
        }
    }

    pub fn text_providers(mut self, providers: Vec<Arc<StubTextProvider>>) -> Self {
        self.text_providers = providers
            .into_iter()
            .map(|p| p as Arc<dyn TextProvider>)
            .collect();
        self
    }

    pub fn image_models(mut self, models: Vec<Arc<StubImageModel>>) -> Self {
        self.image_models = models
            .into_iter()
            .map(|m| m as Arc<dyn ImageModel>)
            .collect();
        self
    }

    pub fn failing_article_store(mut self) -> Self {
        self.articles = Arc::new(InMemoryArticleRepository::failing());
        self
    }

    pub fn subscriptions(mut self, subscriptions: Arc<InMemorySubscriptionRepository>) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    pub fn moderation(mut self, moderation: Arc<InMemoryModerationRepository>) -> Self {
        self.moderation = moderation;
        self
    }

    pub fn payments(mut self, gateway: Arc<StubPaymentGateway>) -> Self {
        self.payments = Some(gateway as Arc<dyn PaymentGateway>);
        self
    }

    pub fn build(self) -> AppState {
        AppState {
            config: test_config(),
            articles: self.articles.clone(),
            content_resolver: ContentResolver::new(self.text_providers),
            image_resolver: ImageResolver::new(self.image_models),
            image_store: Arc::new(InlineImageStore),
            subscriptions: self.subscriptions.clone(),
            idempotency: Arc::new(InMemoryIdempotencyStore::default()),
            payments: self.payments,
            moderation: self.moderation,
            applications: Arc::new(InMemoryApplicationRepository::default()),
            analytics: Arc::new(InMemoryAnalyticsRepository {
                articles: self.articles,
                subscriptions: self.subscriptions,
            }),
            analysis: AnalysisService::default(),
        }
    }
}
