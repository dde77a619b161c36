//! HTTP DTOs for the webhook endpoint.
//!
//! Paystack only looks at the status code; the bodies are fixed envelopes.

use serde::{Deserialize, Serialize};

/// Message returned on authentication failure.
pub const INVALID_SIGNATURE_MESSAGE: &str = "Invalid signature";

/// Message returned when the outer boundary fails.
pub const PROCESSING_FAILED_MESSAGE: &str = "Webhook processing failed";

/// `{"received": true}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReceivedResponse {
    pub received: bool,
}

impl WebhookReceivedResponse {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// `{"error": "..."}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookErrorResponse {
    pub error: String,
}

impl WebhookErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn invalid_signature() -> Self {
        Self::new(INVALID_SIGNATURE_MESSAGE)
    }

    pub fn processing_failed() -> Self {
        Self::new(PROCESSING_FAILED_MESSAGE)
    }
}
