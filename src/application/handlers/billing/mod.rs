//! Billing command handlers.

mod expire_subscriptions;
mod handle_paystack_webhook;
mod replay_webhook_failure;

pub use expire_subscriptions::{
    ExpireSubscriptionsHandler, ExpireSubscriptionsResult, DEFAULT_BATCH_SIZE,
};
pub use handle_paystack_webhook::{
    HandlePaystackWebhookCommand, HandlePaystackWebhookHandler, HandlePaystackWebhookResult,
};
pub use replay_webhook_failure::{ReplayOutcome, ReplaySummary, ReplayWebhookFailureHandler};
