//! Axum route handlers for job applications.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::AdminToken;
use crate::careers::intake::{validate_application, ApplicationRequest};
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// POST /api/careers/applications
pub async fn handle_submit_application(
    State(state): State<AppState>,
    Json(req): Json<ApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let application = validate_application(req)?;
    let row = state.applications.insert(application).await?;
    info!("Received application {} for '{}'", row.id, row.position);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/admin/applications
pub async fn handle_list_applications(
    _admin: AdminToken,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    Ok(Json(state.applications.list(limit).await?))
}
