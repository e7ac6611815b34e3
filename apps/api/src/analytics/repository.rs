use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArticleTotals {
    pub total: i64,
    pub published: i64,
    pub total_views: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopArticle {
    pub title: String,
    pub slug: String,
    pub view_count: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRevenue {
    pub currency: String,
    pub amount_cents: i64,
    pub payments: i64,
}

/// Read-only aggregates across articles, subscriptions and payments.
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn article_totals(&self) -> Result<ArticleTotals>;

    async fn top_articles(&self, limit: i64) -> Result<Vec<TopArticle>>;

    async fn subscription_counts(&self) -> Result<Vec<StatusCount>>;

    async fn revenue_by_currency(&self) -> Result<Vec<CurrencyRevenue>>;
}

#[derive(Clone)]
pub struct PgAnalyticsRepository {
    pool: PgPool,
}

impl PgAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    async fn article_totals(&self) -> Result<ArticleTotals> {
        Ok(sqlx::query_as::<_, ArticleTotals>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE is_published) AS published,
                   COALESCE(SUM(view_count), 0)::BIGINT AS total_views
            FROM blog_content
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }

    async fn top_articles(&self, limit: i64) -> Result<Vec<TopArticle>> {
        Ok(sqlx::query_as::<_, TopArticle>(
            r#"
            SELECT title, slug, view_count FROM blog_content
            WHERE is_published
            ORDER BY view_count DESC, created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn subscription_counts(&self) -> Result<Vec<StatusCount>> {
        Ok(sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM subscriptions GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn revenue_by_currency(&self) -> Result<Vec<CurrencyRevenue>> {
        Ok(sqlx::query_as::<_, CurrencyRevenue>(
            r#"
            SELECT currency,
                   COALESCE(SUM(amount_cents), 0)::BIGINT AS amount_cents,
                   COUNT(*) AS payments
            FROM payment_history
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
