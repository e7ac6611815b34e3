use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::generation::slug::create_slug;
use crate::models::article::{ArticleRow, NewArticle};

/// Persistence for generated articles (`blog_content`).
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Most recent published article whose slug equals the query's slug or
    /// whose title contains the query (case-insensitive).
    async fn find_existing(&self, query: &str) -> Result<Option<ArticleRow>>;

    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    async fn insert(&self, article: NewArticle) -> Result<ArticleRow>;

    async fn list_published(&self, limit: i64) -> Result<Vec<ArticleRow>>;

    /// Fetches a published article and bumps its view counter in one statement.
    async fn view_by_slug(&self, slug: &str) -> Result<Option<ArticleRow>>;
}

#[derive(Clone)]
pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn find_existing(&self, query: &str) -> Result<Option<ArticleRow>> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        Ok(sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT * FROM blog_content
            WHERE is_published AND (slug = $1 OR title ILIKE $2)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(create_slug(query))
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM blog_content WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn insert(&self, article: NewArticle) -> Result<ArticleRow> {
        Ok(sqlx::query_as::<_, ArticleRow>(
            r#"
            INSERT INTO blog_content
                (title, slug, content, excerpt, tags, read_time, ai_provider, image_url,
                 view_count, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, TRUE)
            RETURNING *
            "#,
        )
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(&article.excerpt)
        .bind(&article.tags)
        .bind(article.read_time)
        .bind(&article.ai_provider)
        .bind(&article.image_url)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<ArticleRow>> {
        Ok(sqlx::query_as::<_, ArticleRow>(
            "SELECT * FROM blog_content WHERE is_published ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn view_by_slug(&self, slug: &str) -> Result<Option<ArticleRow>> {
        Ok(sqlx::query_as::<_, ArticleRow>(
            r#"
            UPDATE blog_content SET view_count = view_count + 1
            WHERE slug = $1 AND is_published
            RETURNING *
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?)
    }
}

/// Escapes `%`, `_` and `\` so user input is matched literally by ILIKE.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("docker"), "docker");
    }
}
