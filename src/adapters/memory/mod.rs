//! In-memory store adapters.
//!
//! Back the unit and integration test suites. State lives for the lifetime
//! of the process only.

mod account_repository;
mod payment_history_repository;
mod webhook_failure_repository;

pub use account_repository::InMemoryAccountRepository;
pub use payment_history_repository::InMemoryPaymentHistoryRepository;
pub use webhook_failure_repository::InMemoryWebhookFailureRepository;
