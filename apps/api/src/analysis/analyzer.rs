//! Hosted NLP with heuristic fallback.
//!
//! `AnalysisService` asks the hosted analyzer first and drops to the local
//! lexicon/frequency heuristics whenever that call fails. The caller always
//! gets an answer; the `source` fields say which path produced it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::analysis::keywords::{extract_keywords, KeywordOptions};
use crate::analysis::sentiment::{analyze_sentiment, SentimentLabel, SentimentResult};

const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";
const SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
const KEYPHRASE_MODEL: &str = "ml6team/keyphrase-extraction-kbir-inspec";

pub const HEURISTIC_SOURCE: &str = "heuristic";

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn sentiment(&self, text: &str) -> Result<SentimentResult, AnalyzerError>;

    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>, AnalyzerError>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub sentiment: SentimentLabel,
    pub score: f64,
    pub keywords: Vec<String>,
    pub sentiment_source: String,
    pub keywords_source: String,
}

#[derive(Clone, Default)]
pub struct AnalysisService {
    hosted: Option<Arc<dyn TextAnalyzer>>,
}

impl AnalysisService {
    pub fn new(hosted: Option<Arc<dyn TextAnalyzer>>) -> Self {
        Self { hosted }
    }

    pub async fn analyze(&self, text: &str) -> AnalysisReport {
        let options = KeywordOptions::analysis();

        let (sentiment, sentiment_source) = match &self.hosted {
            Some(hosted) => match hosted.sentiment(text).await {
                Ok(result) => (result, hosted.name().to_string()),
                Err(e) => {
                    warn!("Hosted sentiment via {} failed, using heuristic: {e}", hosted.name());
                    (analyze_sentiment(text), HEURISTIC_SOURCE.to_string())
                }
            },
            None => (analyze_sentiment(text), HEURISTIC_SOURCE.to_string()),
        };

        let (keywords, keywords_source) = match &self.hosted {
            Some(hosted) => match hosted.keywords(text, options.top_n).await {
                Ok(keywords) if !keywords.is_empty() => (keywords, hosted.name().to_string()),
                Ok(_) => (extract_keywords(text, &options), HEURISTIC_SOURCE.to_string()),
                Err(e) => {
                    warn!("Hosted keywords via {} failed, using heuristic: {e}", hosted.name());
                    (extract_keywords(text, &options), HEURISTIC_SOURCE.to_string())
                }
            },
            None => (extract_keywords(text, &options), HEURISTIC_SOURCE.to_string()),
        };

        AnalysisReport {
            sentiment: sentiment.label,
            score: sentiment.score,
            keywords,
            sentiment_source,
            keywords_source,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Hugging Face inference backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct KeyphraseSpan {
    word: String,
    score: f64,
}

#[derive(Clone)]
pub struct HuggingFaceAnalyzer {
    client: Client,
    api_key: String,
}

impl HuggingFaceAnalyzer {
    pub fn new(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    async fn infer(&self, model: &str, text: &str) -> Result<serde_json::Value, AnalyzerError> {
        let response = self
            .client
            .post(format!("{HF_INFERENCE_BASE}/{model}"))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TextAnalyzer for HuggingFaceAnalyzer {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn sentiment(&self, text: &str) -> Result<SentimentResult, AnalyzerError> {
        let value = self.infer(SENTIMENT_MODEL, text).await?;
        parse_sentiment(value)
    }

    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>, AnalyzerError> {
        let value = self.infer(KEYPHRASE_MODEL, text).await?;
        parse_keyphrases(value, top_n)
    }
}

/// The classification endpoint answers `[[{label, score}, ...]]`.
/// The positive-class probability becomes the score; labels are mapped with the
/// same 0.5 pivot the heuristic uses.
fn parse_sentiment(value: serde_json::Value) -> Result<SentimentResult, AnalyzerError> {
    let nested: Vec<Vec<LabelScore>> =
        serde_json::from_value(value).map_err(|e| AnalyzerError::Shape(e.to_string()))?;
    let labels = nested
        .into_iter()
        .next()
        .ok_or_else(|| AnalyzerError::Shape("empty classification list".to_string()))?;

    let positive = labels
        .iter()
        .find(|l| l.label.eq_ignore_ascii_case("positive"))
        .map(|l| l.score)
        .or_else(|| {
            labels
                .iter()
                .find(|l| l.label.eq_ignore_ascii_case("negative"))
                .map(|l| 1.0 - l.score)
        })
        .ok_or_else(|| AnalyzerError::Shape("no POSITIVE/NEGATIVE label".to_string()))?;

    let label = if positive > 0.5 {
        SentimentLabel::Positive
    } else if positive < 0.5 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    Ok(SentimentResult {
        label,
        score: positive.clamp(0.0, 1.0),
    })
}

/// Token-classification output: spans sorted by score, deduplicated case-insensitively.
fn parse_keyphrases(value: serde_json::Value, top_n: usize) -> Result<Vec<String>, AnalyzerError> {
    let mut spans: Vec<KeyphraseSpan> =
        serde_json::from_value(value).map_err(|e| AnalyzerError::Shape(e.to_string()))?;
    spans.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut keywords: Vec<String> = Vec::new();
    for span in spans {
        let word = span.word.trim().to_lowercase();
        if !word.is_empty() && !keywords.contains(&word) {
            keywords.push(word);
        }
        if keywords.len() == top_n {
            break;
        }
    }
    Ok(keywords)
}
