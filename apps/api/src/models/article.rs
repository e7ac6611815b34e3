use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted generated article (`blog_content`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    /// Markdown body.
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    /// Minutes.
    pub read_time: i32,
    pub ai_provider: String,
    pub image_url: Option<String>,
    pub view_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload produced by the generation pipeline.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub ai_provider: String,
    pub image_url: Option<String>,
}
