//! Subscription state carried on a marketplace account.
//!
//! Webhooks are the provider's record of truth, so transitions here are
//! unconditional: whatever state the account is in, the latest event wins.
//! The only rule enforced is the tier invariant: an account whose status is
//! `cancelled` or `expired` is always on the free tier.
//!
//! Every transition stamps `updated_at`, which replay uses to recognise
//! transitions that a later delivery has already superseded.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::{SubscriptionStatus, SubscriptionTier};

/// Length of one paid billing period.
pub const DEFAULT_PERIOD_DAYS: i64 = 30;

/// Subscription fields on an account row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscriptionState {
    pub tier: SubscriptionTier,

    /// `None` for accounts that have never subscribed.
    pub status: Option<SubscriptionStatus>,

    pub start_date: Option<Timestamp>,

    pub end_date: Option<Timestamp>,

    /// Paystack `SUB_xxx` code linking the account to its subscription.
    pub provider_subscription_code: Option<String>,

    /// When the last transition was applied.
    pub updated_at: Option<Timestamp>,
}

impl SubscriptionState {
    /// Starts a new paid period from `now`.
    ///
    /// A previously stored subscription code is kept when `subscription_code`
    /// is `None`.
    pub fn activate(
        &mut self,
        tier: SubscriptionTier,
        subscription_code: Option<String>,
        now: Timestamp,
        period_days: i64,
    ) {
        self.tier = tier;
        self.status = Some(SubscriptionStatus::Active);
        self.start_date = Some(now);
        self.end_date = Some(now.add_days(period_days));
        if subscription_code.is_some() {
            self.provider_subscription_code = subscription_code;
        }
        self.updated_at = Some(now);
    }

    /// Immediate downgrade: cancelled accounts lose their paid tier at once.
    pub fn cancel(&mut self, now: Timestamp) {
        self.status = Some(SubscriptionStatus::Cancelled);
        self.tier = SubscriptionTier::Free;
        self.updated_at = Some(now);
    }

    /// Subscription will not renew; tier stays until the expiry sweep runs.
    pub fn mark_not_renewing(&mut self, now: Timestamp) {
        self.status = Some(SubscriptionStatus::Expiring);
        self.updated_at = Some(now);
    }

    /// Extends the end date by one period from whichever is later: `now` or
    /// the current end date.
    ///
    /// Returns the new end date.
    pub fn extend(&mut self, now: Timestamp, period_days: i64) -> Timestamp {
        let base = match self.end_date {
            Some(end) => end.later_of(now),
            None => now,
        };
        let new_end = base.add_days(period_days);
        self.end_date = Some(new_end);
        self.status = Some(SubscriptionStatus::Active);
        self.updated_at = Some(now);
        new_end
    }

    /// Latest renewal charge failed. Tier is left as is.
    pub fn mark_payment_failed(&mut self, now: Timestamp) {
        self.status = Some(SubscriptionStatus::PaymentFailed);
        self.updated_at = Some(now);
    }

    /// End date passed without a renewal.
    pub fn expire(&mut self, now: Timestamp) {
        self.status = Some(SubscriptionStatus::Expired);
        self.tier = SubscriptionTier::Free;
        self.updated_at = Some(now);
    }

    /// True when a transition was applied after `received_at`.
    pub fn changed_since(&self, received_at: Timestamp) -> bool {
        self.updated_at.is_some_and(|at| at.is_after(&received_at))
    }

    /// True once a live subscription's end date is strictly before `now`.
    pub fn has_lapsed(&self, now: Timestamp) -> bool {
        let live = self.status.is_some_and(|s| s.lapses_at_end_date());
        live && self.end_date.is_some_and(|end| end.is_before(&now))
    }

    /// Ads are shown exactly to free-tier accounts.
    ///
    /// Cancellation downgrades the tier immediately, so there is no period
    /// during which a cancelled account still hides ads.
    pub fn ads_visible(&self) -> bool {
        !self.tier.is_paid()
    }
}

/// The slice of a profile row the webhook path reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub email: String,
    pub subscription: SubscriptionState,
}

impl Account {
    /// Account with no subscription history.
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            subscription: SubscriptionState::default(),
        }
    }
}
