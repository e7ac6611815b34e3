use axum::{extract::State, Json};

use crate::analytics::report::{build_report, AnalyticsReport};
use crate::auth::AdminToken;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/admin/analytics
pub async fn handle_analytics(
    _admin: AdminToken,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsReport>, AppError> {
    Ok(Json(build_report(state.analytics.as_ref()).await?))
}
