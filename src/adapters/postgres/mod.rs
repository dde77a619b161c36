//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresAccountRepository` - subscription columns of `profiles`
//! - `PostgresPaymentHistoryRepository` - idempotent `payment_history` inserts
//! - `PostgresWebhookFailureRepository` - `webhook_failures` dead-letter store

mod account_repository;
mod payment_history_repository;
mod webhook_failure_repository;

pub use account_repository::PostgresAccountRepository;
pub use payment_history_repository::PostgresPaymentHistoryRepository;
pub use webhook_failure_repository::PostgresWebhookFailureRepository;
