//! Article generation: orchestrates the full pipeline.
//!
//! Flow: validate → reuse existing (unless forced) → text fallback chain →
//!       markdown post-processing → unique slug → optional header image →
//!       persist → return.
//!
//! Only persistence can fail the request. Provider failures degrade: text
//! falls back to the local template, images are simply omitted.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::article::prepare_article;
use crate::generation::prompts::image_prompt;
use crate::generation::repository::ArticleRepository;
use crate::generation::slug::{create_slug, with_suffix};
use crate::models::article::{ArticleRow, NewArticle};
use crate::state::AppState;

const MAX_QUERY_CHARS: usize = 200;
/// Gives up on numbered suffixes after this many collisions.
const MAX_SLUG_ATTEMPTS: u32 = 50;
const DEFAULT_SLUG: &str = "article";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArticleRequest {
    pub search_query: String,
    #[serde(default)]
    pub force_regenerate: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArticleResponse {
    pub content: ArticleRow,
    pub is_existing: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

pub async fn generate_article(
    state: &AppState,
    request: GenerateArticleRequest,
) -> Result<GenerateArticleResponse, AppError> {
    // Step 1: Validate
    let query = request.search_query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("searchQuery is required".to_string()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "searchQuery must be at most {MAX_QUERY_CHARS} characters"
        )));
    }

    // Step 2: Reuse an existing article unless regeneration is forced
    if !request.force_regenerate {
        if let Some(existing) = state.articles.find_existing(query).await? {
            info!("Returning existing article '{}' for '{}'", existing.slug, query);
            return Ok(GenerateArticleResponse {
                content: existing,
                is_existing: true,
            });
        }
    }

    // Step 3: Text via provider chain (never fails)
    let generated = state.content_resolver.generate_content(query).await;

    // Step 4: Derive title, excerpt, tags, read time
    let prepared = prepare_article(query, &generated.content);

    // Step 5: Unique slug
    let base_slug = [create_slug(&prepared.title), create_slug(query)]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SLUG.to_string());
    let slug = unique_slug(state.articles.as_ref(), &base_slug).await?;

    // Step 6: Optional header image
    let image_url = generate_image_url(state, &prepared.title, &slug).await;

    // Step 7: Persist
    let article = state
        .articles
        .insert(NewArticle {
            title: prepared.title,
            slug,
            content: prepared.content,
            excerpt: prepared.excerpt,
            tags: prepared.tags,
            read_time: prepared.read_time,
            ai_provider: generated.provider_name,
            image_url,
        })
        .await?;

    info!(
        "Generated article '{}' via {} (image: {})",
        article.slug,
        article.ai_provider,
        article.image_url.is_some()
    );

    Ok(GenerateArticleResponse {
        content: article,
        is_existing: false,
    })
}

/// `base`, then `base-2`, `base-3`, ... until one is free.
async fn unique_slug(articles: &dyn ArticleRepository, base: &str) -> Result<String, AppError> {
    if !articles.slug_exists(base).await? {
        return Ok(base.to_string());
    }
    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = with_suffix(base, n);
        if !articles.slug_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(format!(
        "Could not find a free slug for '{base}'"
    )))
}

async fn generate_image_url(state: &AppState, title: &str, slug: &str) -> Option<String> {
    let image = state
        .image_resolver
        .generate_image(&image_prompt(title))
        .await?;

    let key = format!("blog-images/{slug}.{}", image.data.extension());
    match state.image_store.store(&key, &image.data).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Storing image from {} failed, continuing without: {e}", image.model);
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
