//! Header-image generation across a list of hosted diffusion models.
//!
//! Same shape as the text chain: each model gets one attempt, failures are
//! logged, and the next model is tried. Unlike text there is no local
//! fallback; an article without an image is still a complete article.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use thiserror::Error;
use tracing::{info, warn};

const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

/// Tried in this order.
pub const DEFAULT_IMAGE_MODELS: &[&str] = &[
    "stabilityai/stable-diffusion-xl-base-1.0",
    "runwayml/stable-diffusion-v1-5",
    "CompVis/stable-diffusion-v1-4",
];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Expected an image, got content-type '{0}'")]
    NotAnImage(String),

    #[error("Model returned an empty image")]
    Empty,

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct ImageData {
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub data: ImageData,
    pub model: String,
}

impl ImageData {
    /// File extension for storage keys, from the content type.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }
}

#[async_trait]
pub trait ImageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<ImageData, ImageError>;
}

/// A single text-to-image model on the Hugging Face inference API.
#[derive(Clone)]
pub struct HuggingFaceImageModel {
    client: Client,
    api_key: String,
    model: String,
}

impl HuggingFaceImageModel {
    pub fn new(client: Client, api_key: String, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
        }
    }

    /// One model per entry of `DEFAULT_IMAGE_MODELS`, sharing a client and key.
    pub fn default_chain(client: &Client, api_key: &str) -> Vec<Arc<dyn ImageModel>> {
        DEFAULT_IMAGE_MODELS
            .iter()
            .map(|model| {
                Arc::new(HuggingFaceImageModel::new(
                    client.clone(),
                    api_key.to_string(),
                    *model,
                )) as Arc<dyn ImageModel>
            })
            .collect()
    }
}

#[async_trait]
impl ImageModel for HuggingFaceImageModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<ImageData, ImageError> {
        let response = self
            .client
            .post(format!("{HF_INFERENCE_BASE}/{}", self.model))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ImageError::NotAnImage(content_type));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        Ok(ImageData {
            bytes,
            content_type,
        })
    }
}

#[derive(Clone, Default)]
pub struct ImageResolver {
    models: Vec<Arc<dyn ImageModel>>,
}

impl ImageResolver {
    pub fn new(models: Vec<Arc<dyn ImageModel>>) -> Self {
        Self { models }
    }

    /// First model that produces an image wins; `None` when all fail.
    pub async fn generate_image(&self, prompt: &str) -> Option<GeneratedImage> {
        for model in &self.models {
            match model.generate(prompt).await {
                Ok(data) => {
                    info!("Image generated by {} ({} bytes)", model.name(), data.bytes.len());
                    return Some(GeneratedImage {
                        data,
                        model: model.name().to_string(),
                    });
                }
                Err(e) => warn!("Image model {} failed: {e}", model.name()),
            }
        }
        if !self.models.is_empty() {
            warn!("All {} image models failed; continuing without image", self.models.len());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubImageModel;

    #[tokio::test]
    async fn test_first_working_model_wins() {
        let broken = StubImageModel::failing("model-a");
        let working = StubImageModel::ok("model-b");
        let unused = StubImageModel::ok("model-c");
        let resolver = ImageResolver::new(vec![broken.clone(), working, unused.clone()]);

        let image = resolver.generate_image("a prompt").await.unwrap();
        assert_eq!(image.model, "model-b");
        assert_eq!(broken.calls(), 1);
        assert_eq!(unused.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_failing_yields_none() {
        let resolver = ImageResolver::new(vec![
            StubImageModel::failing("model-a"),
            StubImageModel::failing("model-b"),
        ]);
        assert!(resolver.generate_image("a prompt").await.is_none());
    }

    #[tokio::test]
    async fn test_no_models_yields_none() {
        assert!(ImageResolver::default().generate_image("p").await.is_none());
    }

    #[test]
    fn test_extension_from_content_type() {
        let data = ImageData {
            bytes: Bytes::from_static(b"x"),
            content_type: "image/png".to_string(),
        };
        assert_eq!(data.extension(), "png");
        let data = ImageData {
            bytes: Bytes::from_static(b"x"),
            content_type: "image/jpeg".to_string(),
        };
        assert_eq!(data.extension(), "jpg");
    }
}
