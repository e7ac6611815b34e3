use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row in `job_applications`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub position: String,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub full_name: String,
    pub email: String,
    pub position: String,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
}
