//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `GIGBRIDGE` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use gigbridge_webhooks::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod billing;
mod database;
mod error;
mod payment;
mod server;

pub use billing::BillingConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Structs holding secrets are not `Clone`; pass sections by reference.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment configuration (Paystack)
    pub payment: PaymentConfig,

    /// Billing period and background maintenance
    #[serde(default)]
    pub billing: BillingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `GIGBRIDGE` prefix
    /// 3. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `GIGBRIDGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GIGBRIDGE__PAYMENT__PAYSTACK_SECRET_KEY=...` -> `payment.paystack_secret_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GIGBRIDGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.billing.validate()?;
        // A request cut off by the HTTP timeout gets an empty 408 instead of
        // the 500 envelope, and nothing is dead-lettered.
        if self.server.request_timeout_secs <= self.database.acquire_timeout_secs {
            return Err(ValidationError::TimeoutBelowAcquire);
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
