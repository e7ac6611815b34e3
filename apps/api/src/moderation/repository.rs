use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::content::{ContentRow, ModerationUpdate};
use crate::moderation::status::ModerationStatus;

/// Moderation columns of the `content` table.
#[async_trait]
pub trait ModerationRepository: Send + Sync {
    /// Newest first; every status when `status` is `None`.
    async fn list(&self, status: Option<ModerationStatus>, limit: i64) -> Result<Vec<ContentRow>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentRow>>;

    /// Single-row update, last writer wins.
    async fn update_moderation(
        &self,
        id: Uuid,
        update: &ModerationUpdate,
    ) -> Result<Option<ContentRow>>;
}

#[derive(Clone)]
pub struct PgModerationRepository {
    pool: PgPool,
}

impl PgModerationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationRepository for PgModerationRepository {
    async fn list(&self, status: Option<ModerationStatus>, limit: i64) -> Result<Vec<ContentRow>> {
        Ok(sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT * FROM content
            WHERE ($1::TEXT IS NULL OR moderation_status = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContentRow>> {
        Ok(
            sqlx::query_as::<_, ContentRow>("SELECT * FROM content WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update_moderation(
        &self,
        id: Uuid,
        update: &ModerationUpdate,
    ) -> Result<Option<ContentRow>> {
        Ok(sqlx::query_as::<_, ContentRow>(
            r#"
            UPDATE content
            SET moderation_status = $2,
                flag_reason = $3,
                reviewed_by = $4,
                reviewed_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.status)
        .bind(&update.flag_reason)
        .bind(&update.reviewed_by)
        .bind(update.reviewed_at)
        .fetch_optional(&self.pool)
        .await?)
    }
}
