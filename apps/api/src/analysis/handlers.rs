use axum::{extract::State, Json};
use serde::Deserialize;

use crate::analysis::analyzer::AnalysisReport;
use crate::errors::AppError;
use crate::state::AppState;

/// Upper bound on analyzed text; longer input is rejected rather than truncated.
const MAX_TEXT_CHARS: usize = 20_000;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "text must be at most {MAX_TEXT_CHARS} characters"
        )));
    }

    Ok(Json(state.analysis.analyze(text).await))
}
