//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `AccountRepository` - profile lookup and subscription updates
//! - `PaymentHistoryRepository` - idempotent payment inserts
//! - `WebhookFailureRepository` - dead-letter store for failed webhooks
//!
//! ## Runtime Ports
//!
//! - `Clock` - source of "now" for period arithmetic

mod account_repository;
mod clock;
mod payment_history_repository;
mod webhook_failure_repository;

pub use account_repository::AccountRepository;
pub use clock::Clock;
pub use payment_history_repository::{PaymentHistoryRepository, SaveResult};
pub use webhook_failure_repository::{WebhookFailureRecord, WebhookFailureRepository};
