use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

/// Extractor guarding `/api/admin/*`: requires `Authorization: Bearer <ADMIN_API_TOKEN>`.
#[derive(Debug, Clone, Copy)]
pub struct AdminToken;

#[async_trait]
impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match presented {
            Some(token) if tokens_match(token, &state.config.admin_api_token) => Ok(AdminToken),
            Some(_) => {
                warn!("Rejected admin request to {} with a wrong token", parts.uri.path());
                Err(AppError::Unauthorized)
            }
            None => Err(AppError::Unauthorized),
        }
    }
}

/// Compares every byte so the time taken does not depend on the matching prefix.
fn tokens_match(presented: &str, expected: &str) -> bool {
    if expected.is_empty() || presented.len() != expected.len() {
        return false;
    }
    presented
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
