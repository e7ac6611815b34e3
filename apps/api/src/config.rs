use anyhow::{Context, Result};

const DEFAULT_PAYPAL_API_BASE: &str = "https://api-m.sandbox.paypal.com";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing; provider keys are optional
/// and an absent key simply drops that provider from its fallback chain.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub groq_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub hugging_face_api_key: Option<String>,
    pub paypal: Option<PaypalConfig>,
    pub storage: Option<StorageConfig>,
    pub admin_api_token: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct PaypalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub api_base: String,
}

/// S3 (or MinIO) bucket used for generated article images.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub public_base_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let paypal = match (optional_env("PAYPAL_CLIENT_ID"), optional_env("PAYPAL_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(PaypalConfig {
                client_id,
                client_secret,
                api_base: optional_env("PAYPAL_API_BASE")
                    .unwrap_or_else(|| DEFAULT_PAYPAL_API_BASE.to_string()),
            }),
            _ => None,
        };

        let storage = match optional_env("S3_BUCKET") {
            Some(bucket) => Some(StorageConfig {
                endpoint: optional_env("S3_ENDPOINT"),
                public_base_url: require_env("S3_PUBLIC_BASE_URL")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
                bucket,
            }),
            None => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            groq_api_key: optional_env("GROQ_API_KEY"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            hugging_face_api_key: optional_env("HUGGING_FACE_API_KEY"),
            paypal,
            storage,
            admin_api_token: require_env("ADMIN_API_TOKEN")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, treating an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
