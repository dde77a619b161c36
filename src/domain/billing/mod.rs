//! Billing domain module.
//!
//! Subscription state, payment records, and the Paystack webhook contract.
//!
//! # Module Structure
//!
//! - `tier` - SubscriptionTier levels and the plan-code map
//! - `status` - SubscriptionStatus values
//! - `subscription` - SubscriptionState transitions and the Account slice
//! - `payment` - PaymentRecord and Money
//! - `paystack_event` - Webhook envelope and typed event data
//! - `webhook_verifier` - HMAC-SHA512 signature verification
//! - `webhook_errors` - Webhook error taxonomy

mod payment;
mod paystack_event;
mod status;
mod subscription;
mod tier;
mod webhook_errors;
mod webhook_verifier;

pub use payment::{Money, PaymentRecord, PaymentStatus, DEFAULT_CURRENCY};
pub use paystack_event::{
    ChargeData, Customer, InvoiceData, InvoiceSubscription, PaystackEvent, PaystackEventKind,
    Plan, SubscriptionData,
};
pub use status::SubscriptionStatus;
pub use subscription::{Account, SubscriptionState, DEFAULT_PERIOD_DAYS};
pub use tier::{PlanCodeMap, SubscriptionTier, DEFAULT_PRO_PLAN_CODE};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{PaystackWebhookVerifier, SIGNATURE_HEADER};
