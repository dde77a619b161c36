//! HandlePaystackWebhookHandler - Command handler for Paystack webhook callbacks.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::billing::{
    Account, ChargeData, InvoiceData, Money, PaymentRecord, PaymentStatus, PaystackEvent,
    PaystackEventKind, PaystackWebhookVerifier, PlanCodeMap, SubscriptionData, SubscriptionTier,
    WebhookError, DEFAULT_CURRENCY, DEFAULT_PERIOD_DAYS,
};
use crate::domain::foundation::{Timestamp, UserId, WebhookFailureId};
use crate::ports::{
    AccountRepository, Clock, PaymentHistoryRepository, SaveResult, WebhookFailureRecord,
    WebhookFailureRepository,
};

/// Payment method recorded when Paystack omits `data.channel`.
const DEFAULT_PAYMENT_METHOD: &str = "paystack";

/// Command to handle a Paystack webhook.
#[derive(Debug, Clone)]
pub struct HandlePaystackWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `x-paystack-signature` header, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing.
///
/// Every variant is acknowledged to Paystack with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaystackWebhookResult {
    /// `charge.success` stored a payment row.
    PaymentRecorded { user_id: String, reference: String },
    /// `charge.success` repeated a reference already on file.
    DuplicatePayment { reference: String },
    /// `subscription.create` moved the account onto a tier.
    SubscriptionActivated {
        user_id: String,
        tier: SubscriptionTier,
    },
    /// `subscription.disable` downgraded the account.
    SubscriptionCancelled { user_id: String },
    /// `subscription.not_renew` flagged the account as expiring.
    SubscriptionNotRenewing { user_id: String },
    /// Paid `invoice.update` extended the period.
    SubscriptionRenewed { user_id: String, ends_at: Timestamp },
    /// `invoice.payment_failed` flagged the account.
    PaymentFailed { user_id: String },
    /// Event acknowledged, no action required.
    Acknowledged,
    /// Preconditions not met; nothing written.
    Skipped { reason: String },
    /// Event name this service does not act on.
    Unhandled { event: String },
    /// Store failure; the event was dead-lettered when possible.
    Failed {
        error: String,
        dead_letter: Option<WebhookFailureId>,
    },
}

impl HandlePaystackWebhookResult {
    /// Value of the `outcome` log field.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::PaymentRecorded { .. } => "payment_recorded",
            Self::DuplicatePayment { .. } => "duplicate",
            Self::SubscriptionActivated { .. } => "subscription_activated",
            Self::SubscriptionCancelled { .. } => "subscription_cancelled",
            Self::SubscriptionNotRenewing { .. } => "subscription_not_renewing",
            Self::SubscriptionRenewed { .. } => "subscription_renewed",
            Self::PaymentFailed { .. } => "payment_failed",
            Self::Acknowledged => "acknowledged",
            Self::Skipped { .. } => "skipped",
            Self::Unhandled { .. } => "unhandled",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Handler for Paystack webhooks.
///
/// Authenticates the raw body, then applies the event's state transition.
/// Once a signature checks out the handler never fails: precondition misses
/// become `Skipped` and store failures become `Failed` with a dead-letter
/// record.
pub struct HandlePaystackWebhookHandler {
    verifier: PaystackWebhookVerifier,
    accounts: Arc<dyn AccountRepository>,
    payments: Arc<dyn PaymentHistoryRepository>,
    failures: Arc<dyn WebhookFailureRepository>,
    clock: Arc<dyn Clock>,
    plan_codes: PlanCodeMap,
    period_days: i64,
}

impl HandlePaystackWebhookHandler {
    pub fn new(
        verifier: PaystackWebhookVerifier,
        accounts: Arc<dyn AccountRepository>,
        payments: Arc<dyn PaymentHistoryRepository>,
        failures: Arc<dyn WebhookFailureRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            accounts,
            payments,
            failures,
            clock,
            plan_codes: PlanCodeMap::default(),
            period_days: DEFAULT_PERIOD_DAYS,
        }
    }

    pub fn with_plan_codes(mut self, plan_codes: PlanCodeMap) -> Self {
        self.plan_codes = plan_codes;
        self
    }

    pub fn with_period_days(mut self, period_days: i64) -> Self {
        self.period_days = period_days;
        self
    }

    /// Verifies and processes one webhook delivery.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` / `InvalidSignature` - authentication failed
    /// - `ParseError` - authenticated body is not a `{event, data}` envelope
    pub async fn handle(
        &self,
        cmd: HandlePaystackWebhookCommand,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, cmd.signature.as_deref())?;

        Ok(self.process(&event).await)
    }

    /// Applies an authenticated event, logging the outcome.
    async fn process(&self, event: &PaystackEvent) -> HandlePaystackWebhookResult {
        match self.dispatch(event).await {
            Ok(result) => {
                info!(event = %event.event, outcome = result.outcome(), "Webhook processed");
                result
            }
            Err(err) if err.is_retryable() => {
                error!(
                    event = %event.event,
                    outcome = "failed",
                    error = %err,
                    "Webhook processing failed"
                );
                let dead_letter = self.dead_letter(event, &err).await;
                HandlePaystackWebhookResult::Failed {
                    error: err.to_string(),
                    dead_letter,
                }
            }
            Err(err) => {
                warn!(
                    event = %event.event,
                    outcome = "skipped",
                    reason = %err,
                    "Webhook skipped"
                );
                HandlePaystackWebhookResult::Skipped {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Routes an authenticated event to its transition.
    pub async fn dispatch(
        &self,
        event: &PaystackEvent,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        self.apply(event, None).await
    }

    /// Re-applies an event first received at `received_at`.
    ///
    /// Subscription and invoice events are rejected as `Superseded` when the
    /// account has been transitioned since `received_at`. Charges are applied
    /// regardless; the payment insert is idempotent.
    pub async fn redispatch(
        &self,
        event: &PaystackEvent,
        received_at: Timestamp,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        self.apply(event, Some(received_at)).await
    }

    async fn apply(
        &self,
        event: &PaystackEvent,
        received_at: Option<Timestamp>,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        match event.kind() {
            PaystackEventKind::ChargeSuccess => self.handle_charge_success(event).await,
            PaystackEventKind::SubscriptionCreate => {
                self.handle_subscription_create(event, received_at).await
            }
            PaystackEventKind::SubscriptionDisable => {
                self.handle_subscription_disable(event, received_at).await
            }
            PaystackEventKind::SubscriptionNotRenew => {
                self.handle_subscription_not_renew(event, received_at).await
            }
            PaystackEventKind::InvoiceCreate => Ok(HandlePaystackWebhookResult::Acknowledged),
            PaystackEventKind::InvoiceUpdate => {
                self.handle_invoice_update(event, received_at).await
            }
            PaystackEventKind::InvoicePaymentFailed => {
                self.handle_invoice_payment_failed(event, received_at).await
            }
            PaystackEventKind::Unhandled(name) => {
                info!(event = %name, "Unhandled Paystack event");
                Ok(HandlePaystackWebhookResult::Unhandled { event: name })
            }
        }
    }

    async fn handle_charge_success(
        &self,
        event: &PaystackEvent,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        let data: ChargeData = event.data_as()?;

        let user_id = data
            .user_id()
            .and_then(|id| UserId::new(id).ok())
            .ok_or(WebhookError::MissingField("metadata.user_id"))?;
        let reference = data
            .reference
            .clone()
            .filter(|r| !r.is_empty())
            .ok_or(WebhookError::MissingField("reference"))?;
        let amount = data.amount.ok_or(WebhookError::MissingField("amount"))?;

        let record = PaymentRecord {
            user_id: user_id.clone(),
            amount: Money::from_minor(amount),
            currency: data
                .currency
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            payment_method: data
                .channel
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            payment_reference: reference.clone(),
            payment_status: PaymentStatus::Success,
            payment_data: event.data.clone(),
            created_at: self.clock.now(),
        };

        match self.payments.insert(&record).await? {
            SaveResult::Inserted => {
                info!(
                    user_id = %user_id,
                    reference = %reference,
                    amount = %record.amount,
                    "Payment recorded"
                );
                Ok(HandlePaystackWebhookResult::PaymentRecorded {
                    user_id: user_id.to_string(),
                    reference,
                })
            }
            SaveResult::AlreadyExists => {
                info!(reference = %reference, "Duplicate charge.success ignored");
                Ok(HandlePaystackWebhookResult::DuplicatePayment { reference })
            }
        }
    }

    async fn handle_subscription_create(
        &self,
        event: &PaystackEvent,
        received_at: Option<Timestamp>,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        let data: SubscriptionData = event.data_as()?;

        let email = data
            .customer
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .filter(|e| !e.is_empty())
            .ok_or(WebhookError::MissingField("customer.email"))?;
        // Without a code later disable/renewal events cannot find the
        // account, but the paid tier still applies from now.
        let code = data.subscription_code.clone().filter(|c| !c.is_empty());
        if code.is_none() {
            warn!(email = %email, "subscription.create without subscription_code");
        }

        let mut account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or_else(|| WebhookError::AccountNotFound(format!("email {}", email)))?;
        ensure_current(&account, received_at)?;

        let tier = data
            .plan
            .as_ref()
            .and_then(|p| p.plan_code.as_deref())
            .map(|code| self.plan_codes.tier_for(code))
            .unwrap_or(SubscriptionTier::Free);

        account
            .subscription
            .activate(tier, code, self.clock.now(), self.period_days);
        self.accounts
            .update_subscription(&account.user_id, &account.subscription)
            .await?;

        info!(user_id = %account.user_id, tier = %tier, "Subscription activated");
        Ok(HandlePaystackWebhookResult::SubscriptionActivated {
            user_id: account.user_id.to_string(),
            tier,
        })
    }

    async fn handle_subscription_disable(
        &self,
        event: &PaystackEvent,
        received_at: Option<Timestamp>,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        let data: SubscriptionData = event.data_as()?;
        let code = subscription_code(data.subscription_code.as_deref())?;

        let mut account = self.account_for_subscription(code).await?;
        ensure_current(&account, received_at)?;
        account.subscription.cancel(self.clock.now());
        self.accounts
            .update_subscription(&account.user_id, &account.subscription)
            .await?;

        info!(user_id = %account.user_id, "Subscription cancelled, downgraded to free");
        Ok(HandlePaystackWebhookResult::SubscriptionCancelled {
            user_id: account.user_id.to_string(),
        })
    }

    async fn handle_subscription_not_renew(
        &self,
        event: &PaystackEvent,
        received_at: Option<Timestamp>,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        let data: SubscriptionData = event.data_as()?;
        let code = subscription_code(data.subscription_code.as_deref())?;

        let mut account = self.account_for_subscription(code).await?;
        ensure_current(&account, received_at)?;
        account.subscription.mark_not_renewing(self.clock.now());
        self.accounts
            .update_subscription(&account.user_id, &account.subscription)
            .await?;

        info!(user_id = %account.user_id, "Subscription will not renew");
        Ok(HandlePaystackWebhookResult::SubscriptionNotRenewing {
            user_id: account.user_id.to_string(),
        })
    }

    async fn handle_invoice_update(
        &self,
        event: &PaystackEvent,
        received_at: Option<Timestamp>,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        let data: InvoiceData = event.data_as()?;

        if data.paid != Some(true) {
            return Ok(HandlePaystackWebhookResult::Skipped {
                reason: "invoice not paid".to_string(),
            });
        }
        let code = subscription_code(data.subscription_code())?;

        let mut account = self.account_for_subscription(code).await?;
        ensure_current(&account, received_at)?;
        let ends_at = account
            .subscription
            .extend(self.clock.now(), self.period_days);
        self.accounts
            .update_subscription(&account.user_id, &account.subscription)
            .await?;

        info!(user_id = %account.user_id, ends_at = %ends_at, "Subscription renewed");
        Ok(HandlePaystackWebhookResult::SubscriptionRenewed {
            user_id: account.user_id.to_string(),
            ends_at,
        })
    }

    async fn handle_invoice_payment_failed(
        &self,
        event: &PaystackEvent,
        received_at: Option<Timestamp>,
    ) -> Result<HandlePaystackWebhookResult, WebhookError> {
        let data: InvoiceData = event.data_as()?;
        let code = subscription_code(data.subscription_code())?;

        let mut account = self.account_for_subscription(code).await?;
        ensure_current(&account, received_at)?;
        account.subscription.mark_payment_failed(self.clock.now());
        self.accounts
            .update_subscription(&account.user_id, &account.subscription)
            .await?;

        warn!(user_id = %account.user_id, "Subscription payment failed");
        Ok(HandlePaystackWebhookResult::PaymentFailed {
            user_id: account.user_id.to_string(),
        })
    }

    async fn account_for_subscription(
        &self,
        code: &str,
    ) -> Result<Account, WebhookError> {
        self.accounts
            .find_by_subscription_code(code)
            .await?
            .ok_or_else(|| WebhookError::AccountNotFound(format!("subscription {}", code)))
    }

    async fn dead_letter(
        &self,
        event: &PaystackEvent,
        err: &WebhookError,
    ) -> Option<WebhookFailureId> {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(event = %event.event, error = %e, "Could not serialize dead-letter payload");
                return None;
            }
        };

        let record =
            WebhookFailureRecord::new(&event.event, payload, err.to_string(), self.clock.now());
        match self.failures.record(&record).await {
            Ok(()) => {
                info!(event = %event.event, failure_id = %record.id, "Webhook dead-lettered");
                Some(record.id)
            }
            Err(e) => {
                error!(event = %event.event, error = %e, "Could not record webhook failure");
                None
            }
        }
    }
}

/// Rejects a replayed transition when the account changed after it arrived.
fn ensure_current(account: &Account, received_at: Option<Timestamp>) -> Result<(), WebhookError> {
    match received_at {
        Some(at) if account.subscription.changed_since(at) => Err(WebhookError::Superseded(
            format!("account {} changed after {}", account.user_id, at),
        )),
        _ => Ok(()),
    }
}

fn subscription_code(code: Option<&str>) -> Result<&str, WebhookError> {
    code.filter(|c| !c.is_empty())
        .ok_or(WebhookError::MissingField("subscription_code"))
}
