use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row in `content`: user or AI generated material under moderation.
/// `moderation_status` holds `ModerationStatus::as_str()`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub moderation_status: String,
    pub flag_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Columns written by one moderation transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationUpdate {
    pub status: String,
    pub flag_reason: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}
