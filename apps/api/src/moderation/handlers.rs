//! Axum route handlers for content moderation.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AdminToken;
use crate::errors::AppError;
use crate::models::content::ContentRow;
use crate::moderation::review::{apply_review, report_content, ReviewAction};
use crate::moderation::status::ModerationStatus;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;
const MAX_NOTE_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct ModerationQuery {
    pub status: Option<ModerationStatus>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: ModerationStatus,
    pub reviewer: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub reason: String,
}

fn validate_note(field: &str, note: &str) -> Result<(), AppError> {
    if note.chars().count() > MAX_NOTE_CHARS {
        return Err(AppError::Validation(format!(
            "{field} must be at most {MAX_NOTE_CHARS} characters"
        )));
    }
    Ok(())
}

/// GET /api/admin/content?status=
pub async fn handle_list_content(
    _admin: AdminToken,
    State(state): State<AppState>,
    Query(params): Query<ModerationQuery>,
) -> Result<Json<Vec<ContentRow>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    Ok(Json(state.moderation.list(params.status, limit).await?))
}

/// POST /api/admin/content/:id/review
pub async fn handle_review_content(
    _admin: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ContentRow>, AppError> {
    let reviewer = req.reviewer.trim();
    if reviewer.is_empty() {
        return Err(AppError::Validation("reviewer is required".to_string()));
    }
    let note = req
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if let Some(note) = &note {
        validate_note("note", note)?;
    }

    let action = ReviewAction {
        status: req.status,
        reviewer: Some(reviewer.to_string()),
        note,
    };
    Ok(Json(
        apply_review(state.moderation.as_ref(), id, action, Utc::now()).await?,
    ))
}

/// POST /api/content/:id/report
pub async fn handle_report_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ContentRow>, AppError> {
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("reason is required".to_string()));
    }
    validate_note("reason", reason)?;

    Ok(Json(
        report_content(
            state.moderation.as_ref(),
            id,
            reason.to_string(),
            Utc::now(),
        )
        .await?,
    ))
}
