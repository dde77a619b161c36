//! HTTP handlers for payment-provider webhooks.
//!
//! These handlers connect Axum routes to the webhook command handler. The
//! body is taken as raw bytes: the signature covers the exact bytes sent.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use tracing::warn;

use crate::application::handlers::billing::{
    HandlePaystackWebhookCommand, HandlePaystackWebhookHandler,
};
use crate::domain::billing::{WebhookError, SIGNATURE_HEADER};

use super::dto::{WebhookErrorResponse, WebhookReceivedResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookAppState {
    pub paystack: Arc<HandlePaystackWebhookHandler>,
}

impl WebhookAppState {
    pub fn new(paystack: Arc<HandlePaystackWebhookHandler>) -> Self {
        Self { paystack }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/paystack - Handle Paystack webhook events
pub async fn handle_paystack_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookReceivedResponse>, WebhookApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandlePaystackWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    state.paystack.handle(cmd).await?;

    Ok(Json(WebhookReceivedResponse::received()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        if status.is_success() {
            warn!(error = %self.0, "Webhook failed after dispatch, acknowledging");
            return (status, Json(WebhookReceivedResponse::received())).into_response();
        }

        if self.0.is_authentication_failure() {
            warn!(error = %self.0, "Rejected webhook with bad signature");
            return (status, Json(WebhookErrorResponse::invalid_signature())).into_response();
        }

        warn!(error = %self.0, "Webhook rejected at boundary");
        (status, Json(WebhookErrorResponse::processing_failed())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn api_error_maps_invalid_signature_to_400() {
        let response = WebhookApiError(WebhookError::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_missing_signature_to_400() {
        let response = WebhookApiError(WebhookError::MissingSignature).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_parse_error_to_500() {
        let response =
            WebhookApiError(WebhookError::ParseError("expected value".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn api_error_status_follows_webhook_error() {
        for err in [
            WebhookError::InvalidSignature,
            WebhookError::ParseError("eof".to_string()),
            WebhookError::Database("down".to_string()),
            WebhookError::Superseded("stale".to_string()),
        ] {
            let expected = err.status_code();
            assert_eq!(WebhookApiError(err).into_response().status(), expected);
        }
    }

    #[test]
    fn api_error_acknowledges_dispatch_failures() {
        let response = WebhookApiError(WebhookError::AccountNotFound("x".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
