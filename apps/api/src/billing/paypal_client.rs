//! PayPal REST client for the subscription endpoints.
//!
//! Every call first exchanges the client credentials for a fresh OAuth2
//! access token; tokens are never cached.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::billing::events::SubscriptionResource;
use crate::config::PaypalConfig;

#[derive(Debug, Error)]
pub enum PaypalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PayPal API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid PayPal subscription id: {0}")]
    InvalidSubscriptionId(String),
}

/// PayPal subscription ids look like `I-BW452GLLEP1G`. Anything else is
/// refused before it is placed in a request path.
pub fn is_valid_subscription_id(id: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^I-[A-Z0-9]{1,64}$").expect("subscription id regex is valid"))
        .is_match(id)
}

fn subscription_path(subscription_id: &str, suffix: &str) -> Result<String, PaypalError> {
    if !is_valid_subscription_id(subscription_id) {
        return Err(PaypalError::InvalidSubscriptionId(subscription_id.to_string()));
    }
    Ok(format!("/v1/billing/subscriptions/{subscription_id}{suffix}"))
}

/// The payment provider operations the subscription endpoints need.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn get_subscription(&self, subscription_id: &str)
        -> Result<SubscriptionResource, PaypalError>;

    async fn cancel_subscription(&self, subscription_id: &str, reason: &str)
        -> Result<(), PaypalError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct CancelRequest<'a> {
    reason: &'a str,
}

#[derive(Debug, Deserialize)]
struct PaypalErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct PaypalClient {
    client: Client,
    config: PaypalConfig,
}

impl PaypalClient {
    pub fn new(client: Client, config: PaypalConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn access_token(&self) -> Result<String, PaypalError> {
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let token: TokenResponse = serde_json::from_str(&response.text().await?)?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PaypalClient {
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionResource, PaypalError> {
        let path = subscription_path(subscription_id, "")?;
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let subscription: SubscriptionResource = serde_json::from_str(&response.text().await?)?;
        debug!(
            "PayPal subscription {} status {:?}",
            subscription.id, subscription.status
        );
        Ok(subscription)
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        reason: &str,
    ) -> Result<(), PaypalError> {
        let path = subscription_path(subscription_id, "/cancel")?;
        let token = self.access_token().await?;
        let response = self
            .client
            .post(self.url(&path))
            .bearer_auth(token)
            .json(&CancelRequest { reason })
            .send()
            .await?;

        // 204 No Content on success
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

async fn api_error(response: Response) -> PaypalError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PaypalErrorBody>(&body)
        .ok()
        .and_then(|e| e.message.or(e.name))
        .unwrap_or(body);
    PaypalError::Api { status, message }
}
