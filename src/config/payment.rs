//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::billing::{PlanCodeMap, SubscriptionTier, DEFAULT_PRO_PLAN_CODE};

use super::error::ValidationError;

/// Payment configuration (Paystack)
#[derive(Debug, Deserialize)]
pub struct PaymentConfig {
    /// Paystack secret key; also the webhook HMAC key
    pub paystack_secret_key: SecretString,

    /// Plan code for the Basic tier (required)
    pub basic_plan_code: Option<String>,

    /// Extra plan code for the Pro tier; the built-in Pro code always maps
    pub pro_plan_code: Option<String>,

    /// Plan code for the Elite tier (required)
    pub elite_plan_code: Option<String>,
}

impl PaymentConfig {
    pub fn with_secret_key(key: impl Into<String>) -> Self {
        Self {
            paystack_secret_key: SecretString::new(key.into()),
            basic_plan_code: None,
            pro_plan_code: None,
            elite_plan_code: None,
        }
    }

    /// Check if using Paystack test mode
    pub fn is_test_mode(&self) -> bool {
        self.paystack_secret_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Paystack live mode
    pub fn is_live_mode(&self) -> bool {
        self.paystack_secret_key.expose_secret().starts_with("sk_live_")
    }

    /// Copy of the secret for the webhook verifier.
    pub fn webhook_secret(&self) -> SecretString {
        SecretString::new(self.paystack_secret_key.expose_secret().clone())
    }

    /// Plan-code map from the configured codes.
    ///
    /// Only the Pro code has a built-in value; an unset Basic or Elite code
    /// simply maps nothing to that tier. `validate` rejects that case.
    pub fn plan_codes(&self) -> PlanCodeMap {
        let mut codes = PlanCodeMap::default();
        for (code, tier) in [
            (&self.basic_plan_code, SubscriptionTier::Basic),
            (&self.pro_plan_code, SubscriptionTier::Pro),
            (&self.elite_plan_code, SubscriptionTier::Elite),
        ] {
            if let Some(code) = code {
                codes = codes.with_code(code.as_str(), tier);
            }
        }
        codes
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let key = self.paystack_secret_key.expose_secret();
        if key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYSTACK_SECRET_KEY"));
        }

        // Public keys (pk_) cannot sign webhooks
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidPaystackKey);
        }

        if self.basic_plan_code.is_none() {
            return Err(ValidationError::MissingRequired("BASIC_PLAN_CODE"));
        }
        if self.elite_plan_code.is_none() {
            return Err(ValidationError::MissingRequired("ELITE_PLAN_CODE"));
        }

        for (name, code) in [
            ("basic_plan_code", &self.basic_plan_code),
            ("pro_plan_code", &self.pro_plan_code),
            ("elite_plan_code", &self.elite_plan_code),
        ] {
            if let Some(code) = code {
                if !code.starts_with("PLN_") {
                    return Err(ValidationError::InvalidPlanCode(name));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(key: &str) -> PaymentConfig {
        PaymentConfig {
            basic_plan_code: Some("PLN_basic".to_string()),
            elite_plan_code: Some("PLN_elite".to_string()),
            ..PaymentConfig::with_secret_key(key)
        }
    }

    #[test]
    fn test_is_test_mode() {
        let config = PaymentConfig::with_secret_key("sk_test_xxx");
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn test_is_live_mode() {
        let config = PaymentConfig::with_secret_key("sk_live_xxx");
        assert!(config.is_live_mode());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn test_validation_missing_secret_key() {
        let config = configured("");
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("PAYSTACK_SECRET_KEY"))
        );
    }

    #[test]
    fn test_validation_public_key_rejected() {
        let config = configured("pk_test_xxx");
        assert_eq!(config.validate(), Err(ValidationError::InvalidPaystackKey));
    }

    #[test]
    fn test_validation_requires_basic_and_elite_codes() {
        let config = PaymentConfig {
            elite_plan_code: Some("PLN_elite".to_string()),
            ..PaymentConfig::with_secret_key("sk_test_xxx")
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("BASIC_PLAN_CODE"))
        );

        let config = PaymentConfig {
            basic_plan_code: Some("PLN_basic".to_string()),
            ..PaymentConfig::with_secret_key("sk_test_xxx")
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("ELITE_PLAN_CODE"))
        );
    }

    #[test]
    fn test_validation_bad_plan_code() {
        let config = PaymentConfig {
            pro_plan_code: Some("pro".to_string()),
            ..configured("sk_test_xxx")
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidPlanCode("pro_plan_code"))
        );
    }

    #[test]
    fn test_plan_codes_from_configuration() {
        let codes = configured("sk_test_xxx").plan_codes();

        assert_eq!(codes.tier_for("PLN_basic"), SubscriptionTier::Basic);
        assert_eq!(codes.tier_for(DEFAULT_PRO_PLAN_CODE), SubscriptionTier::Pro);
        assert_eq!(codes.tier_for("PLN_elite"), SubscriptionTier::Elite);
    }

    #[test]
    fn test_unset_codes_map_nothing() {
        let codes = PaymentConfig::with_secret_key("sk_test_xxx").plan_codes();

        assert_eq!(codes.tier_for(DEFAULT_PRO_PLAN_CODE), SubscriptionTier::Pro);
        assert_eq!(codes, PlanCodeMap::default());
    }

    #[test]
    fn test_pro_override_is_added() {
        let config = PaymentConfig {
            pro_plan_code: Some("PLN_pro_v2".to_string()),
            ..configured("sk_test_xxx")
        };
        let codes = config.plan_codes();

        assert_eq!(codes.tier_for("PLN_pro_v2"), SubscriptionTier::Pro);
    }

    #[test]
    fn test_secret_is_redacted_from_debug() {
        let config = PaymentConfig::with_secret_key("sk_live_topsecret");
        assert!(!format!("{:?}", config).contains("topsecret"));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(configured("sk_test_abcd1234").validate().is_ok());
    }
}
