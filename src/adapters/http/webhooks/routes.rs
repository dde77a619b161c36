//! Axum router configuration for webhook endpoints.

use axum::{routing::post, Router};

use super::handlers::{handle_paystack_webhook, WebhookAppState};

/// Create the webhook router.
///
/// Webhooks carry no user authentication; each provider's signature is
/// verified by its handler.
///
/// # Routes
/// - `POST /paystack` - Handle Paystack webhooks
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new().route("/paystack", post(handle_paystack_webhook))
}

/// Webhook routes mounted under `/api/webhooks`.
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new().nest("/api/webhooks", webhook_routes())
}
