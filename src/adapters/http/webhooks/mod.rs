//! HTTP adapter for payment-provider webhooks.
//!
//! - `POST /api/webhooks/paystack` - Handle Paystack webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{WebhookErrorResponse, WebhookReceivedResponse};
pub use handlers::{WebhookApiError, WebhookAppState};
pub use routes::{webhook_router, webhook_routes};
