//! Where generated header images end up.

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use crate::generation::images::{ImageData, ImageError};

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists the image and returns the URL the article should reference.
    async fn store(&self, key: &str, image: &ImageData) -> Result<String, ImageError>;
}

/// Uploads to an S3 (or MinIO) bucket and returns a public URL.
#[derive(Clone)]
pub struct S3ImageStore {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3ImageStore {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn store(&self, key: &str, image: &ImageData) -> Result<String, ImageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(&image.content_type)
            .body(ByteStream::from(image.bytes.clone()))
            .send()
            .await
            .map_err(|e| ImageError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded image to s3://{}/{}", self.bucket, key);
        Ok(public_url(&self.public_base_url, &self.bucket, key))
    }
}

/// Embeds the image as a base64 `data:` URL. Used when no bucket is configured.
#[derive(Clone, Default)]
pub struct InlineImageStore;

#[async_trait]
impl ImageStore for InlineImageStore {
    async fn store(&self, _key: &str, image: &ImageData) -> Result<String, ImageError> {
        Ok(format!(
            "data:{};base64,{}",
            image.content_type,
            STANDARD.encode(&image.bytes)
        ))
    }
}

pub fn public_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), bucket, key)
}
