//! ExpireSubscriptionsHandler - Downgrades subscriptions whose period has ended.
//!
//! Paystack stops renewing a subscription silently when it is disabled or not
//! renewed, so nothing arrives on the webhook at the end date. This sweep
//! closes the gap.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::AccountRepository;

/// Accounts examined per sweep when no batch size is configured.
pub const DEFAULT_BATCH_SIZE: u32 = 500;

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpireSubscriptionsResult {
    /// Users moved to `expired` / `free`.
    pub expired: Vec<String>,
    /// Accounts whose update failed; picked up again next sweep.
    pub failed: u32,
}

pub struct ExpireSubscriptionsHandler {
    accounts: Arc<dyn AccountRepository>,
    batch_size: u32,
}

impl ExpireSubscriptionsHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self {
            accounts,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Expires every live subscription whose end date is before `now`.
    ///
    /// A failed update is logged and counted; the rest of the batch still runs.
    pub async fn run(&self, now: Timestamp) -> Result<ExpireSubscriptionsResult, DomainError> {
        let lapsed = self.accounts.find_lapsed(now, self.batch_size).await?;
        let mut result = ExpireSubscriptionsResult::default();

        for mut account in lapsed {
            account.subscription.expire(now);
            match self
                .accounts
                .update_subscription(&account.user_id, &account.subscription)
                .await
            {
                Ok(()) => {
                    info!(user_id = %account.user_id, "Subscription expired");
                    result.expired.push(account.user_id.to_string());
                }
                Err(e) => {
                    error!(user_id = %account.user_id, error = %e, "Failed to expire subscription");
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountRepository;
    use crate::domain::billing::{Account, SubscriptionState, SubscriptionStatus, SubscriptionTier};
    use crate::domain::foundation::UserId;

    fn account(id: &str, status: SubscriptionStatus, end: Timestamp) -> Account {
        let mut a = Account::new(UserId::new(id).unwrap(), format!("{}@example.ng", id));
        a.subscription = SubscriptionState {
            tier: SubscriptionTier::Basic,
            status: Some(status),
            start_date: Some(end.add_days(-30)),
            end_date: Some(end),
            provider_subscription_code: Some(format!("SUB_{}", id)),
            updated_at: Some(end.add_days(-30)),
        };
        a
    }

    #[tokio::test]
    async fn expires_lapsed_live_subscriptions() {
        let now = Timestamp::now();
        let repo = Arc::new(InMemoryAccountRepository::with_accounts([
            account("u_expiring", SubscriptionStatus::Expiring, now.add_days(-1)),
            account("u_failed", SubscriptionStatus::PaymentFailed, now.add_days(-2)),
            account("u_current", SubscriptionStatus::Active, now.add_days(3)),
            account("u_cancelled", SubscriptionStatus::Cancelled, now.add_days(-5)),
        ]));
        let handler = ExpireSubscriptionsHandler::new(repo.clone());

        let result = handler.run(now).await.unwrap();

        assert_eq!(result.expired, vec!["u_failed", "u_expiring"]);
        assert_eq!(result.failed, 0);
        let expired = repo.get(&UserId::new("u_expiring").unwrap()).await.unwrap();
        assert_eq!(expired.subscription.status, Some(SubscriptionStatus::Expired));
        assert_eq!(expired.subscription.tier, SubscriptionTier::Free);
        assert!(expired.subscription.ads_visible());
        assert_eq!(expired.subscription.updated_at, Some(now));
        let current = repo.get(&UserId::new("u_current").unwrap()).await.unwrap();
        assert_eq!(current.subscription.tier, SubscriptionTier::Basic);
    }

    #[tokio::test]
    async fn second_sweep_finds_nothing() {
        let now = Timestamp::now();
        let repo = Arc::new(InMemoryAccountRepository::with_accounts([account(
            "u_1",
            SubscriptionStatus::Active,
            now.add_days(-1),
        )]));
        let handler = ExpireSubscriptionsHandler::new(repo.clone());

        handler.run(now).await.unwrap();
        let again = handler.run(now).await.unwrap();

        assert!(again.expired.is_empty());
        assert_eq!(repo.write_count(), 1);
    }

    #[tokio::test]
    async fn batch_size_bounds_one_sweep() {
        let now = Timestamp::now();
        let repo = Arc::new(InMemoryAccountRepository::with_accounts([
            account("u_1", SubscriptionStatus::Active, now.add_days(-1)),
            account("u_2", SubscriptionStatus::Active, now.add_days(-2)),
        ]));
        let handler = ExpireSubscriptionsHandler::new(repo).with_batch_size(1);

        let result = handler.run(now).await.unwrap();

        assert_eq!(result.expired, vec!["u_2"]);
    }
}
