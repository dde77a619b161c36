//! In-memory AccountRepository for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::domain::billing::{Account, SubscriptionState};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::AccountRepository;

/// Accounts keyed by user id.
///
/// Counts subscription writes so tests can assert that a request touched
/// nothing.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<UserId, Account>>,
    writes: AtomicUsize,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let map = accounts
            .into_iter()
            .map(|a| (a.user_id.clone(), a))
            .collect();
        Self {
            accounts: RwLock::new(map),
            writes: AtomicUsize::new(0),
        }
    }

    /// Adds or replaces an account without counting a write.
    pub async fn insert(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.user_id.clone(), account);
    }

    pub async fn get(&self, user_id: &UserId) -> Option<Account> {
        self.accounts.read().await.get(user_id).cloned()
    }

    /// Number of `update_subscription` calls that changed a row.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_subscription_code(
        &self,
        code: &str,
    ) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.subscription.provider_subscription_code.as_deref() == Some(code))
            .cloned())
    }

    async fn update_subscription(
        &self,
        user_id: &UserId,
        subscription: &SubscriptionState,
    ) -> Result<(), DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(user_id).ok_or_else(|| {
            DomainError::new(ErrorCode::AccountNotFound, format!("user {}", user_id))
        })?;
        account.subscription = subscription.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_lapsed(&self, now: Timestamp, limit: u32) -> Result<Vec<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        let mut lapsed: Vec<Account> = accounts
            .values()
            .filter(|a| a.subscription.has_lapsed(now))
            .cloned()
            .collect();
        lapsed.sort_by_key(|a| a.subscription.end_date);
        lapsed.truncate(limit as usize);
        Ok(lapsed)
    }
}
