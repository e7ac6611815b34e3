//! Moderation transitions on stored content.
//!
//! Every accepted transition stamps `reviewed_at`; `reviewed_by` is set for
//! admin reviews and cleared for user reports.

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::content::{ContentRow, ModerationUpdate};
use crate::moderation::repository::ModerationRepository;
use crate::moderation::status::ModerationStatus;

#[derive(Debug, Clone)]
pub struct ReviewAction {
    pub status: ModerationStatus,
    pub reviewer: Option<String>,
    /// Stored in `flag_reason`; the previous reason is kept when absent.
    pub note: Option<String>,
}

pub async fn apply_review(
    content: &dyn ModerationRepository,
    id: Uuid,
    action: ReviewAction,
    now: DateTime<Utc>,
) -> Result<ContentRow, AppError> {
    let current = content
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;

    let from: ModerationStatus = current
        .moderation_status
        .parse()
        .with_context(|| format!("Content {id} has a corrupt moderation status"))?;
    let to = from
        .transition_to(action.status)
        .map_err(|e| AppError::Conflict(e.to_string()))?;

    let update = ModerationUpdate {
        status: to.as_str().to_string(),
        flag_reason: action.note.or(current.flag_reason),
        reviewed_by: action.reviewer,
        reviewed_at: now,
    };
    let updated = content
        .update_moderation(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Content {id} not found")))?;

    info!(
        "Content {id}: {from} -> {to} (by {})",
        updated.reviewed_by.as_deref().unwrap_or("user report")
    );
    Ok(updated)
}

/// A user report moves content to `flagged` with the reason as the note.
pub async fn report_content(
    content: &dyn ModerationRepository,
    id: Uuid,
    reason: String,
    now: DateTime<Utc>,
) -> Result<ContentRow, AppError> {
    apply_review(
        content,
        id,
        ReviewAction {
            status: ModerationStatus::Flagged,
            reviewer: None,
            note: Some(reason),
        },
        now,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryModerationRepository;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn approve(by: &str) -> ReviewAction {
        ReviewAction {
            status: ModerationStatus::Approved,
            reviewer: Some(by.to_string()),
            note: None,
        }
    }

    #[tokio::test]
    async fn test_pending_can_be_approved_directly() {
        let repo = InMemoryModerationRepository::default();
        let item = repo.seed(ModerationStatus::Pending);

        let updated = apply_review(&repo, item.id, approve("admin@example.com"), now())
            .await
            .unwrap();
        assert_eq!(updated.moderation_status, "approved");
        assert_eq!(updated.reviewed_at, Some(now()));
        assert_eq!(updated.reviewed_by.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn test_pending_can_be_rejected_with_note() {
        let repo = InMemoryModerationRepository::default();
        let item = repo.seed(ModerationStatus::Pending);

        let action = ReviewAction {
            status: ModerationStatus::Rejected,
            reviewer: Some("mod".to_string()),
            note: Some("spam".to_string()),
        };
        let updated = apply_review(&repo, item.id, action, now()).await.unwrap();
        assert_eq!(updated.moderation_status, "rejected");
        assert_eq!(updated.flag_reason.as_deref(), Some("spam"));
        assert!(updated.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_report_flags_and_stamps_without_reviewer() {
        let repo = InMemoryModerationRepository::default();
        let item = repo.seed(ModerationStatus::Pending);

        let updated = report_content(&repo, item.id, "offensive".to_string(), now())
            .await
            .unwrap();
        assert_eq!(updated.moderation_status, "flagged");
        assert_eq!(updated.flag_reason.as_deref(), Some("offensive"));
        assert_eq!(updated.reviewed_at, Some(now()));
        assert!(updated.reviewed_by.is_none());
    }

    #[tokio::test]
    async fn test_flagged_back_to_pending_keeps_reason() {
        let repo = InMemoryModerationRepository::default();
        let item = repo.seed(ModerationStatus::Pending);
        report_content(&repo, item.id, "offensive".to_string(), now())
            .await
            .unwrap();

        let action = ReviewAction {
            status: ModerationStatus::Pending,
            reviewer: Some("mod".to_string()),
            note: None,
        };
        let updated = apply_review(&repo, item.id, action, now()).await.unwrap();
        assert_eq!(updated.moderation_status, "pending");
        assert_eq!(updated.flag_reason.as_deref(), Some("offensive"));
    }

    #[tokio::test]
    async fn test_approved_is_final() {
        let repo = InMemoryModerationRepository::default();
        let item = repo.seed(ModerationStatus::Approved);

        let err = report_content(&repo, item.id, "late report".to_string(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.get(item.id).unwrap().moderation_status, "approved");
    }

    #[tokio::test]
    async fn test_missing_content_is_not_found() {
        let repo = InMemoryModerationRepository::default();
        let err = apply_review(&repo, Uuid::new_v4(), approve("admin"), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
