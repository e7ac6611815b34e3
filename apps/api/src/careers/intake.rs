//! Job-application validation.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::application::NewApplication;

const MAX_NAME_CHARS: usize = 200;
const MAX_COVER_LETTER_CHARS: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub full_name: String,
    pub email: String,
    pub position: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "{field} must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trims every field, rejects missing name/position and malformed emails.
pub fn validate_application(req: ApplicationRequest) -> Result<NewApplication, AppError> {
    let full_name = required("fullName", &req.full_name)?;
    let position = required("position", &req.position)?;

    let email = req.email.trim().to_lowercase();
    if !email_regex().is_match(&email) {
        return Err(AppError::Validation("email is not a valid address".to_string()));
    }

    let resume_url = non_empty(req.resume_url);
    if let Some(url) = &resume_url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::Validation(
                "resumeUrl must be an http(s) URL".to_string(),
            ));
        }
    }

    let cover_letter = non_empty(req.cover_letter);
    if cover_letter
        .as_ref()
        .is_some_and(|c| c.chars().count() > MAX_COVER_LETTER_CHARS)
    {
        return Err(AppError::Validation(format!(
            "coverLetter must be at most {MAX_COVER_LETTER_CHARS} characters"
        )));
    }

    Ok(NewApplication {
        full_name,
        email,
        position,
        resume_url,
        cover_letter,
    })
}
