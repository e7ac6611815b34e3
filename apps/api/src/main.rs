mod analysis;
mod analytics;
mod auth;
mod billing;
mod careers;
mod config;
mod db;
mod errors;
mod generation;
mod llm_client;
mod models;
mod moderation;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::{AnalysisService, HuggingFaceAnalyzer, TextAnalyzer};
use crate::analytics::repository::PgAnalyticsRepository;
use crate::billing::idempotency::{IdempotencyStore, InMemoryIdempotencyStore, RedisIdempotencyStore};
use crate::billing::paypal_client::{PaymentGateway, PaypalClient};
use crate::billing::repository::PgSubscriptionRepository;
use crate::careers::repository::PgApplicationRepository;
use crate::config::{Config, StorageConfig};
use crate::db::create_pool;
use crate::generation::images::{HuggingFaceImageModel, ImageResolver};
use crate::generation::repository::PgArticleRepository;
use crate::generation::resolver::ContentResolver;
use crate::generation::storage::{ImageStore, InlineImageStore, S3ImageStore};
use crate::llm_client::{build_http_client, GeminiProvider, GroqProvider, TextProvider};
use crate::moderation::repository::PgModerationRepository;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting content generator API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Shared HTTP client for every outbound integration
    let http = build_http_client()?;

    // Text providers, in fallback order
    let mut providers: Vec<Arc<dyn TextProvider>> = Vec::new();
    if let Some(key) = &config.groq_api_key {
        providers.push(Arc::new(GroqProvider::new(http.clone(), key.clone())));
    }
    if let Some(key) = &config.gemini_api_key {
        providers.push(Arc::new(GeminiProvider::new(http.clone(), key.clone())));
    }
    let content_resolver = ContentResolver::new(providers);
    info!(
        "Text provider chain: {:?} (template fallback last)",
        content_resolver.provider_names()
    );

    // Image models and hosted analysis share the Hugging Face key
    let (image_resolver, analysis) = match &config.hugging_face_api_key {
        Some(key) => {
            let hosted: Arc<dyn TextAnalyzer> =
                Arc::new(HuggingFaceAnalyzer::new(http.clone(), key.clone()));
            (
                ImageResolver::new(HuggingFaceImageModel::default_chain(&http, key)),
                AnalysisService::new(Some(hosted)),
            )
        }
        None => {
            info!("HUGGING_FACE_API_KEY not set; images disabled, analysis is heuristic only");
            (ImageResolver::default(), AnalysisService::default())
        }
    };

    // Image storage: S3 / MinIO when configured, inline data URLs otherwise
    let image_store: Arc<dyn ImageStore> = match &config.storage {
        Some(storage) => {
            let s3 = build_s3_client(storage).await;
            info!("S3 client initialized (bucket: {})", storage.bucket);
            Arc::new(S3ImageStore::new(
                s3,
                storage.bucket.clone(),
                storage.public_base_url.clone(),
            ))
        }
        None => Arc::new(InlineImageStore),
    };

    // Webhook idempotency: Redis when available, in-process FIFO otherwise
    let idempotency: Arc<dyn IdempotencyStore> = match &config.redis_url {
        Some(url) => {
            let redis = redis::Client::open(url.as_str())?;
            info!("Redis idempotency store initialized");
            Arc::new(RedisIdempotencyStore::new(redis))
        }
        None => Arc::new(InMemoryIdempotencyStore::default()),
    };

    let payments: Option<Arc<dyn PaymentGateway>> = match &config.paypal {
        Some(paypal) => {
            info!("PayPal client initialized ({})", paypal.api_base);
            Some(Arc::new(PaypalClient::new(http.clone(), paypal.clone())))
        }
        None => {
            info!("PayPal credentials not set; subscribe/cancel endpoints disabled");
            None
        }
    };

    // Build app state
    let state = AppState {
        config: config.clone(),
        articles: Arc::new(PgArticleRepository::new(db.clone())),
        content_resolver,
        image_resolver,
        image_store,
        subscriptions: Arc::new(PgSubscriptionRepository::new(db.clone())),
        idempotency,
        payments,
        moderation: Arc::new(PgModerationRepository::new(db.clone())),
        applications: Arc::new(PgApplicationRepository::new(db.clone())),
        analytics: Arc::new(PgAnalyticsRepository::new(db)),
        analysis,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (custom endpoint) or AWS.
async fn build_s3_client(storage: &StorageConfig) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &storage.access_key_id,
        &storage.secret_access_key,
        None,
        None,
        "contentgen-static",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials);
    if let Some(endpoint) = &storage.endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let s3_config = loader.load().await;

    let s3_conf = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(storage.endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_conf)
}
