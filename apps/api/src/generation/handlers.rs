//! Axum route handlers for the Blog API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::generation::generator::{
    generate_article, GenerateArticleRequest, GenerateArticleResponse,
};
use crate::models::article::ArticleRow;
use crate::state::AppState;

const DEFAULT_LIST_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// POST /api/blog/generate
///
/// Returns an existing matching article, or runs the full generation pipeline.
/// Blocks for the duration of the provider calls.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateArticleRequest>,
) -> Result<Json<GenerateArticleResponse>, AppError> {
    Ok(Json(generate_article(&state, request).await?))
}

/// GET /api/blog
pub async fn handle_list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ArticleRow>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    Ok(Json(state.articles.list_published(limit).await?))
}

/// GET /api/blog/:slug
///
/// Counts a view on every successful fetch.
pub async fn handle_get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleRow>, AppError> {
    let article = state
        .articles
        .view_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article '{slug}' not found")))?;
    Ok(Json(article))
}
