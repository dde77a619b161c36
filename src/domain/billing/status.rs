//! Subscription status values.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Where an account sits in the Paystack subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and renewing.
    Active,

    /// Disabled at the provider. Tier is dropped to free.
    Cancelled,

    /// Will not renew; entitlements last until the end date.
    Expiring,

    /// End date passed without renewal.
    Expired,

    /// Latest renewal charge failed.
    PaymentFailed,
}

impl SubscriptionStatus {
    /// Column value as stored on the profile row.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expiring => "expiring",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::PaymentFailed => "payment_failed",
        }
    }

    /// Parses the stored column value.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "expiring" => Ok(SubscriptionStatus::Expiring),
            "expired" => Ok(SubscriptionStatus::Expired),
            "payment_failed" => Ok(SubscriptionStatus::PaymentFailed),
            other => Err(ValidationError::invalid_format(
                "subscription_status",
                format!("unknown status '{}'", other),
            )),
        }
    }

    /// Statuses the expiry sweep moves to `Expired` once the end date passes.
    pub fn lapses_at_end_date(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active
                | SubscriptionStatus::Expiring
                | SubscriptionStatus::PaymentFailed
        )
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
