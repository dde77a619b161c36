//! Payment history records.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Currency used when the provider omits one.
pub const DEFAULT_CURRENCY: &str = "NGN";

/// Monetary amount held in minor units (kobo for NGN).
///
/// Rendered in major units with two decimals; never converted through floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }

    /// Major-unit rendering such as `"1500.00"`, suitable for a numeric column.
    pub fn to_major_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_major_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// One row of `payment_history`.
///
/// `payment_reference` is the idempotency key: the store keeps at most one
/// row per reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub user_id: UserId,
    pub amount: Money,
    pub currency: String,
    pub payment_method: String,
    pub payment_reference: String,
    pub payment_status: PaymentStatus,
    pub payment_data: serde_json::Value,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_render_as_major() {
        assert_eq!(Money::from_minor(150000).to_major_string(), "1500.00");
        assert_eq!(Money::from_minor(150050).to_major_string(), "1500.50");
        assert_eq!(Money::from_minor(5).to_major_string(), "0.05");
        assert_eq!(Money::from_minor(0).to_major_string(), "0.00");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(Money::from_minor(-250).to_major_string(), "-2.50");
    }

    #[test]
    fn display_matches_major_string() {
        assert_eq!(Money::from_minor(99).to_string(), "0.99");
    }

    #[test]
    fn payment_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }
}
