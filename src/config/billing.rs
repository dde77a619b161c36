//! Billing configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::billing::DEFAULT_PERIOD_DAYS;

use super::error::ValidationError;

/// Billing configuration (subscription period and background maintenance)
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Length of one paid period in days
    #[serde(default = "default_period_days")]
    pub period_days: i64,

    /// Seconds between maintenance passes (expiry sweep and replay); 0 disables
    #[serde(default = "default_sweep_interval")]
    pub expiry_sweep_interval_secs: u64,

    /// Accounts expired per sweep
    #[serde(default = "default_sweep_batch_size")]
    pub sweep_batch_size: u32,

    /// Dead-lettered webhooks replayed per pass
    #[serde(default = "default_replay_batch_size")]
    pub replay_batch_size: u32,

    /// Attempts after which a dead-lettered webhook is left for an operator
    #[serde(default = "default_replay_max_attempts")]
    pub replay_max_attempts: u32,
}

impl BillingConfig {
    /// Maintenance interval, or None when disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.expiry_sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.expiry_sweep_interval_secs))
    }

    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=366).contains(&self.period_days) {
            return Err(ValidationError::InvalidPeriod);
        }
        if self.replay_max_attempts == 0 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            period_days: default_period_days(),
            expiry_sweep_interval_secs: default_sweep_interval(),
            sweep_batch_size: default_sweep_batch_size(),
            replay_batch_size: default_replay_batch_size(),
            replay_max_attempts: default_replay_max_attempts(),
        }
    }
}

fn default_period_days() -> i64 {
    DEFAULT_PERIOD_DAYS
}

fn default_sweep_interval() -> u64 {
    3600
}

fn default_sweep_batch_size() -> u32 {
    500
}

fn default_replay_batch_size() -> u32 {
    50
}

fn default_replay_max_attempts() -> u32 {
    5
}
