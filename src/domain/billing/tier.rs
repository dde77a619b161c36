//! Subscription tier definitions and the Paystack plan-code mapping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::ValidationError;

/// Plan code for the Pro monthly plan. Basic and Elite codes come from
/// configuration.
pub const DEFAULT_PRO_PLAN_CODE: &str = "PLN_i6ijfhscu3l8v3k";

/// Subscription service level.
///
/// Controls feature and ad-visibility entitlements across the marketplace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Basic,
    Pro,
    Elite,
}

impl SubscriptionTier {
    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionTier::Free)
    }

    /// Column value as stored on the profile row.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Elite => "elite",
        }
    }

    /// Parses the stored column value.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "basic" => Ok(SubscriptionTier::Basic),
            "pro" => Ok(SubscriptionTier::Pro),
            "elite" => Ok(SubscriptionTier::Elite),
            other => Err(ValidationError::invalid_format(
                "subscription_tier",
                format!("unknown tier '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps Paystack plan codes to paid tiers.
///
/// Unknown codes resolve to [`SubscriptionTier::Free`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCodeMap {
    codes: HashMap<String, SubscriptionTier>,
}

impl PlanCodeMap {
    /// Builds a map from the three paid plan codes.
    pub fn new(
        basic: impl Into<String>,
        pro: impl Into<String>,
        elite: impl Into<String>,
    ) -> Self {
        let mut codes = HashMap::new();
        codes.insert(basic.into(), SubscriptionTier::Basic);
        codes.insert(pro.into(), SubscriptionTier::Pro);
        codes.insert(elite.into(), SubscriptionTier::Elite);
        Self { codes }
    }

    /// Adds or replaces the tier for `plan_code`.
    pub fn with_code(mut self, plan_code: impl Into<String>, tier: SubscriptionTier) -> Self {
        self.codes.insert(plan_code.into(), tier);
        self
    }

    /// Resolves a plan code to its tier.
    pub fn tier_for(&self, plan_code: &str) -> SubscriptionTier {
        self.codes
            .get(plan_code)
            .copied()
            .unwrap_or(SubscriptionTier::Free)
    }
}

/// Only the Pro plan code is built in.
impl Default for PlanCodeMap {
    fn default() -> Self {
        Self {
            codes: HashMap::new(),
        }
        .with_code(DEFAULT_PRO_PLAN_CODE, SubscriptionTier::Pro)
    }
}
