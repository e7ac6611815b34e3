//! Provider fallback chain for article text.
//!
//! Providers are tried once each, in order. A provider fails when it errors,
//! returns nothing, or returns fewer than `MIN_ARTICLE_CHARS` characters.
//! When the chain is exhausted the local template is used, so this never fails.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::generation::prompts::{blog_prompt, blog_system};
use crate::generation::template::fallback_article;
use crate::llm_client::{strip_markdown_fences, TextProvider};

pub const MIN_ARTICLE_CHARS: usize = 500;
pub const FALLBACK_PROVIDER: &str = "Fallback System";

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedText {
    pub content: String,
    pub provider_name: String,
}

#[derive(Clone)]
pub struct ContentResolver {
    providers: Vec<Arc<dyn TextProvider>>,
}

impl ContentResolver {
    pub fn new(providers: Vec<Arc<dyn TextProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Generates an article about `topic`, walking the chain in priority order.
    pub async fn generate_content(&self, topic: &str) -> GeneratedText {
        let prompt = blog_prompt(topic);

        for provider in &self.providers {
            match provider.generate(&prompt, blog_system()).await {
                Ok(text) => {
                    let body = strip_markdown_fences(&text);
                    let len = body.chars().count();
                    if len >= MIN_ARTICLE_CHARS {
                        info!("{} generated {} chars for '{}'", provider.name(), len, topic);
                        return GeneratedText {
                            content: body.to_string(),
                            provider_name: provider.name().to_string(),
                        };
                    }
                    warn!(
                        "{} returned {} chars (< {}), trying next provider",
                        provider.name(),
                        len,
                        MIN_ARTICLE_CHARS
                    );
                }
                Err(e) => {
                    warn!("{} failed, trying next provider: {e}", provider.name());
                }
            }
        }

        warn!(
            "All {} text providers failed for '{}'; using {}",
            self.providers.len(),
            topic,
            FALLBACK_PROVIDER
        );
        GeneratedText {
            content: fallback_article(topic),
            provider_name: FALLBACK_PROVIDER.to_string(),
        }
    }
}
