use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Flagged,
    Approved,
    Rejected,
}

#[derive(Debug, Error, PartialEq)]
pub enum ModerationError {
    #[error("Unknown moderation status '{0}'")]
    UnknownStatus(String),

    #[error("Cannot move content from {from} to {to}")]
    InvalidTransition {
        from: ModerationStatus,
        to: ModerationStatus,
    },
}

impl ModerationStatus {
    pub const ALL: [ModerationStatus; 4] =
        [Self::Pending, Self::Flagged, Self::Approved, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Flagged => "flagged",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// pending → flagged | approved | rejected
    /// flagged → approved | rejected | pending
    /// approved and rejected are final.
    pub fn can_transition_to(self, next: ModerationStatus) -> bool {
        use ModerationStatus::*;
        matches!(
            (self, next),
            (Pending, Flagged | Approved | Rejected) | (Flagged, Approved | Rejected | Pending)
        )
    }

    pub fn transition_to(self, next: ModerationStatus) -> Result<ModerationStatus, ModerationError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ModerationError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = ModerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModerationError::UnknownStatus(s.to_string()))
    }
}
