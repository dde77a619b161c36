//! Webhook error types for Paystack webhook handling.
//!
//! Only authentication failures and envelope parse failures ever reach the
//! provider as a non-2xx status. Everything else is acknowledged with 200
//! after logging, so Paystack does not start a redelivery storm over a
//! data-layer problem.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header absent.
    #[error("Missing signature")]
    MissingSignature,

    /// Signature header present but does not match the body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Authenticated body is not a `{event, data}` envelope.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the event data.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Event data present but of the wrong shape.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// No account matches the event's email or subscription code.
    #[error("Account not found for {0}")]
    AccountNotFound(String),

    /// A later transition on the account already replaced this one.
    #[error("Superseded: {0}")]
    Superseded(String),

    /// Store operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if applying the event again later could succeed.
    ///
    /// Retryable failures are written to the dead-letter store.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Database(_))
    }

    /// Returns true for failures that stop the request before dispatch.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature | WebhookError::InvalidSignature
        )
    }

    /// Maps the error to the HTTP status Paystack will see.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::BAD_REQUEST
            }

            WebhookError::ParseError(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // Handled inside dispatch and acknowledged
            WebhookError::MissingField(_)
            | WebhookError::MalformedPayload(_)
            | WebhookError::AccountNotFound(_)
            | WebhookError::Superseded(_)
            | WebhookError::Database(_) => StatusCode::OK,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AccountNotFound => WebhookError::AccountNotFound(err.message),
            _ => WebhookError::Database(err.to_string()),
        }
    }
}
