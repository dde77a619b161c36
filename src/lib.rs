//! GigBridge Webhooks - Paystack webhook ingest for the GigBridge job marketplace
//!
//! Verifies Paystack deliveries, applies subscription and payment state
//! transitions idempotently, and dead-letters deliveries that fail on
//! transient storage errors so they can be replayed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides `server.log_level` when set. Fails if a subscriber is
/// already installed.
pub fn init_tracing(config: &ServerConfig) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    }
}
