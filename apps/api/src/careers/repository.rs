use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::application::{ApplicationRow, NewApplication};

pub const RECEIVED_STATUS: &str = "received";

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Stores the application with status `received`.
    async fn insert(&self, application: NewApplication) -> Result<ApplicationRow>;

    async fn list(&self, limit: i64) -> Result<Vec<ApplicationRow>>;
}

#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn insert(&self, application: NewApplication) -> Result<ApplicationRow> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO job_applications
                (full_name, email, position, resume_url, cover_letter, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&application.full_name)
        .bind(&application.email)
        .bind(&application.position)
        .bind(&application.resume_url)
        .bind(&application.cover_letter)
        .bind(RECEIVED_STATUS)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list(&self, limit: i64) -> Result<Vec<ApplicationRow>> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM job_applications ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}
