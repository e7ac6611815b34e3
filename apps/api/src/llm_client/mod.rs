//! LLM clients: the only modules that talk to hosted text-generation APIs.
//!
//! Each provider implements `TextProvider`; the generation pipeline never calls
//! a provider API directly, it walks the fallback chain in `generation::resolver`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use thiserror::Error;

pub mod gemini;
pub mod groq;
pub mod prompts;

pub use gemini::GeminiProvider;
pub use groq::GroqProvider;

const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.7;
/// Generation commonly takes 30–60s; anything beyond two minutes is treated as a failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A hosted text-generation backend. Implementations make exactly one request
/// per call; fallback between providers is the caller's concern.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Human-readable provider name, persisted as `ai_provider` on articles.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

/// Builds the shared reqwest client used by every outbound integration.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turns a non-2xx response into `LlmError::Api`, preferring the provider's
/// `{"error": {"message": ...}}` body when it parses.
pub(crate) async fn api_error(response: Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// Strips a ```markdown ... ``` (or bare ```) fence wrapping the whole reply.
/// A reply that merely starts or ends with a code block is returned as is.
pub fn strip_markdown_fences(text: &str) -> &str {
    let text = text.trim();
    let Some((opening, rest)) = text.split_once('\n') else {
        return text;
    };
    let Some(info) = opening.strip_prefix("```").map(str::trim) else {
        return text;
    };
    if !matches!(info, "" | "markdown" | "md") {
        return text;
    }
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    if !(body.is_empty() || body.ends_with('\n')) {
        return text;
    }
    let inner_fences: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("```"))
        .collect();
    // Inner fences must pair up. Under a bare opening fence, a bare first
    // inner fence closes a leading code block rather than opening a new one.
    if inner_fences.len() % 2 != 0 {
        return text;
    }
    if info.is_empty() && inner_fences.first().is_some_and(|f| *f == "```") {
        return text;
    }
    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markdown_fences_with_tag() {
        let input = "```markdown\n# Title\n\nBody\n```";
        assert_eq!(strip_markdown_fences(input), "# Title\n\nBody");
    }

    #[test]
    fn test_strip_markdown_fences_without_tag() {
        let input = "```\n# Title\n```";
        assert_eq!(strip_markdown_fences(input), "# Title");
    }

    #[test]
    fn test_strip_markdown_fences_leaves_leading_code_block() {
        let input = "```bash\ndocker run hello\n```\n\nDocker is a container runtime.";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn test_strip_markdown_fences_leaves_unwrapped_article_between_code_blocks() {
        let input = "```\ndocker ps\n```\n\nList containers, then stop one:\n\n```\ndocker stop web\n```";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn test_strip_markdown_fences_unwraps_article_with_inner_code_block() {
        let input = "```md\n# Title\n\n```rust\nfn main() {}\n```\n\nDone.\n```";
        assert_eq!(
            strip_markdown_fences(input),
            "# Title\n\n```rust\nfn main() {}\n```\n\nDone."
        );
    }

    #[test]
    fn test_strip_markdown_fences_keeps_inner_code_blocks() {
        let input = "# Title\n\n```rust\nfn main() {}\n```";
        assert_eq!(strip_markdown_fences(input), input);
    }
}
