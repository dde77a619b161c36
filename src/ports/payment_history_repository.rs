//! PaymentHistoryRepository port - append-only record of successful charges.
//!
//! Paystack redelivers `charge.success` whenever it does not see a timely
//! 2xx, so the same reference can arrive several times. Implementations must
//! keep at most one row per `payment_reference` and report a repeat as
//! `SaveResult::AlreadyExists` rather than an error.

use async_trait::async_trait;

use crate::domain::billing::PaymentRecord;
use crate::domain::foundation::DomainError;

/// Result of attempting to insert a record keyed by an idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this key).
    Inserted,
    /// A record with this key already exists.
    AlreadyExists,
}

#[async_trait]
pub trait PaymentHistoryRepository: Send + Sync {
    /// Insert a payment, ignoring a duplicate reference.
    ///
    /// Uses `ON CONFLICT DO NOTHING` semantics.
    async fn insert(&self, record: &PaymentRecord) -> Result<SaveResult, DomainError>;

    /// Look up a payment by its reference.
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;
}
