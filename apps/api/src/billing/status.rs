use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Local subscription status, stored as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    Expired,
    Suspended,
    PastDue,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 5] = [
        Self::Active,
        Self::Cancelled,
        Self::Expired,
        Self::Suspended,
        Self::PastDue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
            Self::PastDue => "past_due",
        }
    }

    /// Maps PayPal's subscription `status` vocabulary onto ours.
    /// `APPROVAL_PENDING` and anything unknown have no local equivalent.
    pub fn from_paypal(status: &str) -> Option<Self> {
        match status.to_ascii_uppercase().as_str() {
            "ACTIVE" | "APPROVED" => Some(Self::Active),
            "SUSPENDED" => Some(Self::Suspended),
            "CANCELLED" => Some(Self::Cancelled),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown subscription status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for SubscriptionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
