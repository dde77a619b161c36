//! Account repository port.
//!
//! Profiles are owned by the marketplace backend; the webhook service only
//! looks accounts up by the keys Paystack gives it and rewrites the
//! subscription columns.

use async_trait::async_trait;

use crate::domain::billing::{Account, SubscriptionState};
use crate::domain::foundation::{DomainError, Timestamp, UserId};

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Find an account by its Paystack subscription code.
    async fn find_by_subscription_code(&self, code: &str)
        -> Result<Option<Account>, DomainError>;

    /// Overwrite the subscription columns of an account.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if no row matches `user_id`
    /// - `DatabaseError` on persistence failure
    async fn update_subscription(
        &self,
        user_id: &UserId,
        subscription: &SubscriptionState,
    ) -> Result<(), DomainError>;

    /// Accounts whose live subscription ended before `now`.
    ///
    /// "Live" means status `active`, `expiring`, or `payment_failed`.
    async fn find_lapsed(&self, now: Timestamp, limit: u32) -> Result<Vec<Account>, DomainError>;
}
