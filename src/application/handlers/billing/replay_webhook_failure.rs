//! ReplayWebhookFailureHandler - Re-applies dead-lettered webhooks.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::PaystackEvent;
use crate::domain::foundation::{DomainError, ErrorCode, WebhookFailureId};
use crate::ports::{Clock, WebhookFailureRecord, WebhookFailureRepository};

use super::handle_paystack_webhook::{HandlePaystackWebhookHandler, HandlePaystackWebhookResult};

/// Outcome of replaying one failure record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Dispatch succeeded; the record is resolved.
    Resolved(HandlePaystackWebhookResult),
    /// Dispatch failed on a precondition that a retry cannot fix, or a later
    /// transition superseded the event; the record is resolved so it is not
    /// picked up again.
    Discarded { reason: String },
    /// Store still failing; another attempt was counted.
    StillFailing { attempts: u32, error: String },
    /// Record was resolved before this call.
    AlreadyResolved,
}

/// Totals from one `replay_pending` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub resolved: u32,
    pub discarded: u32,
    pub still_failing: u32,
    /// Records left alone because they reached `max_attempts`.
    pub exhausted: u32,
}

/// Handler for replaying dead-lettered webhooks.
///
/// Stored payloads were authenticated on arrival, so replay goes straight to
/// dispatch without a signature check. A subscription or invoice event whose
/// account has changed since the record was written is discarded as
/// superseded.
pub struct ReplayWebhookFailureHandler {
    webhooks: Arc<HandlePaystackWebhookHandler>,
    failures: Arc<dyn WebhookFailureRepository>,
    clock: Arc<dyn Clock>,
}

impl ReplayWebhookFailureHandler {
    pub fn new(
        webhooks: Arc<HandlePaystackWebhookHandler>,
        failures: Arc<dyn WebhookFailureRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            webhooks,
            failures,
            clock,
        }
    }

    /// Replays a single failure.
    ///
    /// # Errors
    ///
    /// - `WebhookFailureNotFound` if `id` does not exist
    /// - `DatabaseError` if the failure store itself fails
    pub async fn replay(&self, id: &WebhookFailureId) -> Result<ReplayOutcome, DomainError> {
        let record = self.failures.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::WebhookFailureNotFound,
                format!("webhook failure {} not found", id),
            )
        })?;

        if record.is_resolved() {
            return Ok(ReplayOutcome::AlreadyResolved);
        }

        self.replay_record(&record).await
    }

    /// Replays unresolved failures, oldest first.
    ///
    /// Records with `attempts >= max_attempts` are counted but left alone.
    pub async fn replay_pending(
        &self,
        limit: u32,
        max_attempts: u32,
    ) -> Result<ReplaySummary, DomainError> {
        let mut summary = ReplaySummary::default();

        for record in self.failures.list_unresolved(limit).await? {
            if record.attempts >= max_attempts {
                summary.exhausted += 1;
                continue;
            }

            match self.replay_record(&record).await? {
                ReplayOutcome::Resolved(_) => summary.resolved += 1,
                ReplayOutcome::Discarded { .. } => summary.discarded += 1,
                ReplayOutcome::StillFailing { .. } => summary.still_failing += 1,
                ReplayOutcome::AlreadyResolved => {}
            }
        }

        Ok(summary)
    }

    async fn replay_record(
        &self,
        record: &WebhookFailureRecord,
    ) -> Result<ReplayOutcome, DomainError> {
        let event: PaystackEvent = match serde_json::from_value(record.payload.clone()) {
            Ok(event) => event,
            Err(e) => return self.discard(record, format!("unreadable payload: {}", e)).await,
        };

        match self.webhooks.redispatch(&event, record.created_at).await {
            Ok(result) => {
                self.failures
                    .mark_resolved(&record.id, self.clock.now())
                    .await?;
                info!(
                    failure_id = %record.id,
                    event = %record.event_type,
                    outcome = result.outcome(),
                    "Webhook replay succeeded"
                );
                Ok(ReplayOutcome::Resolved(result))
            }
            Err(err) if err.is_retryable() => {
                let error = err.to_string();
                self.failures
                    .record_attempt(&record.id, &error, self.clock.now())
                    .await?;
                let attempts = record.attempts + 1;
                warn!(
                    failure_id = %record.id,
                    event = %record.event_type,
                    attempts,
                    error = %error,
                    "Webhook replay failed"
                );
                Ok(ReplayOutcome::StillFailing { attempts, error })
            }
            Err(err) => self.discard(record, err.to_string()).await,
        }
    }

    async fn discard(
        &self,
        record: &WebhookFailureRecord,
        reason: String,
    ) -> Result<ReplayOutcome, DomainError> {
        self.failures
            .mark_resolved(&record.id, self.clock.now())
            .await?;
        warn!(
            failure_id = %record.id,
            event = %record.event_type,
            reason = %reason,
            "Webhook replay discarded"
        );
        Ok(ReplayOutcome::Discarded { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{
        InMemoryAccountRepository, InMemoryPaymentHistoryRepository,
        InMemoryWebhookFailureRepository,
    };
    use crate::domain::billing::{
        Account, PaymentRecord, PaystackWebhookVerifier, SubscriptionState, SubscriptionStatus,
        SubscriptionTier,
    };
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::ports::{PaymentHistoryRepository, SaveResult};
    use async_trait::async_trait;
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Payment store that fails until switched on.
    struct FlakyPaymentHistoryRepository {
        healthy: AtomicBool,
        inner: InMemoryPaymentHistoryRepository,
    }

    impl FlakyPaymentHistoryRepository {
        fn down() -> Self {
            Self {
                healthy: AtomicBool::new(false),
                inner: InMemoryPaymentHistoryRepository::new(),
            }
        }

        fn recover(&self) {
            self.healthy.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PaymentHistoryRepository for FlakyPaymentHistoryRepository {
        async fn insert(&self, record: &PaymentRecord) -> Result<SaveResult, DomainError> {
            if !self.healthy.load(Ordering::SeqCst) {
                return Err(DomainError::database("connection refused"));
            }
            self.inner.insert(record).await
        }

        async fn find_by_reference(
            &self,
            reference: &str,
        ) -> Result<Option<PaymentRecord>, DomainError> {
            self.inner.find_by_reference(reference).await
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        now: Timestamp,
        accounts: Arc<InMemoryAccountRepository>,
        payments: Arc<FlakyPaymentHistoryRepository>,
        failures: Arc<InMemoryWebhookFailureRepository>,
        webhooks: Arc<HandlePaystackWebhookHandler>,
        replay: ReplayWebhookFailureHandler,
    }

    fn fixture() -> Fixture {
        fixture_with(vec![])
    }

    fn fixture_with(accounts: Vec<Account>) -> Fixture {
        let now = Timestamp::now();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::at(now));
        let accounts = Arc::new(InMemoryAccountRepository::with_accounts(accounts));
        let payments = Arc::new(FlakyPaymentHistoryRepository::down());
        let failures = Arc::new(InMemoryWebhookFailureRepository::new());
        let webhooks = Arc::new(HandlePaystackWebhookHandler::new(
            PaystackWebhookVerifier::new(SecretString::new("sk_test_replay".to_string())),
            accounts.clone(),
            payments.clone(),
            failures.clone(),
            clock.clone(),
        ));
        let replay = ReplayWebhookFailureHandler::new(webhooks.clone(), failures.clone(), clock);
        Fixture {
            now,
            accounts,
            payments,
            failures,
            webhooks,
            replay,
        }
    }

    /// Active Pro account whose last transition was ten days before `now`.
    fn subscribed(now: Timestamp) -> Account {
        let mut account = Account::new(UserId::new("u_1").unwrap(), "ada@example.ng");
        account.subscription = SubscriptionState {
            tier: SubscriptionTier::Pro,
            status: Some(SubscriptionStatus::Active),
            start_date: Some(now.add_days(-10)),
            end_date: Some(now.add_days(20)),
            provider_subscription_code: Some("SUB_1".to_string()),
            updated_at: Some(now.add_days(-10)),
        };
        account
    }

    fn invoice(event: &str, paid: bool) -> serde_json::Value {
        json!({
            "event": event,
            "data": { "paid": paid, "subscription": { "subscription_code": "SUB_1" } }
        })
    }

    async fn subscription_of(f: &Fixture) -> SubscriptionState {
        f.accounts
            .get(&UserId::new("u_1").unwrap())
            .await
            .unwrap()
            .subscription
    }

    async fn stored_failure(f: &Fixture, payload: serde_json::Value) -> WebhookFailureRecord {
        stored_failure_at(f, payload, Timestamp::now()).await
    }

    async fn stored_failure_at(
        f: &Fixture,
        payload: serde_json::Value,
        received_at: Timestamp,
    ) -> WebhookFailureRecord {
        let event = payload["event"].as_str().unwrap_or_default().to_string();
        let record = WebhookFailureRecord::new(&event, payload, "connection refused", received_at);
        f.failures.record(&record).await.unwrap();
        record
    }

    fn charge(reference: &str) -> serde_json::Value {
        json!({
            "event": "charge.success",
            "data": { "reference": reference, "amount": 10000, "metadata": { "user_id": "u_1" } }
        })
    }

    // ════════════════════════════════════════════════════════════════════════════
    // replay
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn replay_while_store_down_counts_attempt() {
        let f = fixture();
        let record = stored_failure(&f, charge("ref_1")).await;

        let outcome = f.replay.replay(&record.id).await.unwrap();

        assert!(matches!(outcome, ReplayOutcome::StillFailing { attempts: 2, .. }));
        let stored = f.failures.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.attempts, 2);
        assert!(!stored.is_resolved());
    }

    #[tokio::test]
    async fn replay_after_recovery_resolves() {
        let f = fixture();
        let record = stored_failure(&f, charge("ref_1")).await;
        f.payments.recover();

        let outcome = f.replay.replay(&record.id).await.unwrap();

        assert!(matches!(
            outcome,
            ReplayOutcome::Resolved(HandlePaystackWebhookResult::PaymentRecorded { .. })
        ));
        assert!(f.payments.find_by_reference("ref_1").await.unwrap().is_some());
        assert!(f
            .failures
            .find_by_id(&record.id)
            .await
            .unwrap()
            .unwrap()
            .is_resolved());
    }

    #[tokio::test]
    async fn resolved_records_are_not_replayed_again() {
        let f = fixture();
        let record = stored_failure(&f, charge("ref_1")).await;
        f.payments.recover();
        f.replay.replay(&record.id).await.unwrap();

        let outcome = f.replay.replay(&record.id).await.unwrap();

        assert_eq!(outcome, ReplayOutcome::AlreadyResolved);
    }

    #[tokio::test]
    async fn unreadable_payload_is_discarded() {
        let f = fixture();
        let record = stored_failure(&f, json!({ "not": "an envelope" })).await;

        let outcome = f.replay.replay(&record.id).await.unwrap();

        assert!(matches!(outcome, ReplayOutcome::Discarded { .. }));
        assert!(f.failures.list_unresolved(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let f = fixture();

        let result = f.replay.replay(&WebhookFailureId::new()).await;

        assert!(matches!(result, Err(e) if e.code == ErrorCode::WebhookFailureNotFound));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Ordering
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn stale_payment_failure_does_not_undo_later_renewal() {
        let f = fixture_with(vec![subscribed(Timestamp::now())]);
        let stale = stored_failure_at(
            &f,
            invoice("invoice.payment_failed", false),
            f.now.add_days(-1),
        )
        .await;
        let event: PaystackEvent =
            serde_json::from_value(invoice("invoice.update", true)).unwrap();
        f.webhooks.dispatch(&event).await.unwrap();

        let outcome = f.replay.replay(&stale.id).await.unwrap();

        assert!(matches!(outcome, ReplayOutcome::Discarded { .. }));
        assert_eq!(subscription_of(&f).await.status, Some(SubscriptionStatus::Active));
        assert!(f.failures.find_by_id(&stale.id).await.unwrap().unwrap().is_resolved());
    }

    #[tokio::test]
    async fn stale_renewal_does_not_reactivate_cancelled_account() {
        let f = fixture_with(vec![subscribed(Timestamp::now())]);
        let stale = stored_failure_at(&f, invoice("invoice.update", true), f.now.add_days(-1)).await;
        let disable: PaystackEvent = serde_json::from_value(json!({
            "event": "subscription.disable",
            "data": { "subscription_code": "SUB_1" }
        }))
        .unwrap();
        f.webhooks.dispatch(&disable).await.unwrap();

        let outcome = f.replay.replay(&stale.id).await.unwrap();

        assert!(matches!(outcome, ReplayOutcome::Discarded { .. }));
        let sub = subscription_of(&f).await;
        assert_eq!(sub.tier, SubscriptionTier::Free);
        assert_eq!(sub.status, Some(SubscriptionStatus::Cancelled));
    }

    #[tokio::test]
    async fn transition_newer_than_account_state_is_applied() {
        let f = fixture_with(vec![subscribed(Timestamp::now())]);
        let record = stored_failure_at(
            &f,
            invoice("invoice.payment_failed", false),
            f.now.add_days(-1),
        )
        .await;

        let outcome = f.replay.replay(&record.id).await.unwrap();

        assert!(matches!(
            outcome,
            ReplayOutcome::Resolved(HandlePaystackWebhookResult::PaymentFailed { .. })
        ));
        assert_eq!(
            subscription_of(&f).await.status,
            Some(SubscriptionStatus::PaymentFailed)
        );
    }

    #[tokio::test]
    async fn old_charge_is_still_recorded() {
        let f = fixture_with(vec![subscribed(Timestamp::now())]);
        let record = stored_failure_at(&f, charge("ref_old"), f.now.add_days(-30)).await;
        f.payments.recover();

        let outcome = f.replay.replay(&record.id).await.unwrap();

        assert!(matches!(
            outcome,
            ReplayOutcome::Resolved(HandlePaystackWebhookResult::PaymentRecorded { .. })
        ));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // replay_pending
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn replay_pending_skips_exhausted_records() {
        let f = fixture();
        let fresh = stored_failure(&f, charge("ref_fresh")).await;
        let mut exhausted = WebhookFailureRecord::new(
            "charge.success",
            charge("ref_old"),
            "connection refused",
            Timestamp::now().add_days(-1),
        );
        exhausted.attempts = 5;
        f.failures.record(&exhausted).await.unwrap();
        f.payments.recover();

        let summary = f.replay.replay_pending(10, 5).await.unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                resolved: 1,
                discarded: 0,
                still_failing: 0,
                exhausted: 1,
            }
        );
        assert!(f.failures.find_by_id(&fresh.id).await.unwrap().unwrap().is_resolved());
        assert!(f.payments.find_by_reference("ref_old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replay_pending_counts_still_failing() {
        let f = fixture();
        stored_failure(&f, charge("ref_1")).await;
        stored_failure(&f, charge("ref_2")).await;

        let summary = f.replay.replay_pending(10, 5).await.unwrap();

        assert_eq!(summary.still_failing, 2);
        assert_eq!(f.failures.list_unresolved(10).await.unwrap().len(), 2);
    }
}
