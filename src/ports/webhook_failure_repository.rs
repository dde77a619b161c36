//! WebhookFailureRepository port - dead-letter store for authenticated
//! webhooks whose state transition could not be applied.
//!
//! Paystack is always answered with 200 once a signature checks out, so a
//! store outage would otherwise leave no trace beyond a log line. Each
//! retryable failure is persisted here with the original payload so an
//! operator can find it and replay it.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, WebhookFailureId};

/// A dead-lettered webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookFailureRecord {
    pub id: WebhookFailureId,

    /// Paystack event name, e.g. `charge.success`.
    pub event_type: String,

    /// The authenticated envelope, as received.
    pub payload: serde_json::Value,

    /// Most recent error message.
    pub error_message: String,

    /// Number of failed applications, including the first.
    pub attempts: u32,

    pub created_at: Timestamp,

    pub last_attempt_at: Timestamp,

    /// Set once a replay succeeds.
    pub resolved_at: Option<Timestamp>,
}

impl WebhookFailureRecord {
    /// Creates a record for a first failure.
    pub fn new(
        event_type: impl Into<String>,
        payload: serde_json::Value,
        error: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: WebhookFailureId::new(),
            event_type: event_type.into(),
            payload,
            error_message: error.into(),
            attempts: 1,
            created_at: now,
            last_attempt_at: now,
            resolved_at: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

/// Port for storing and retrieving dead-lettered webhooks.
#[async_trait]
pub trait WebhookFailureRepository: Send + Sync {
    /// Persist a new failure.
    async fn record(&self, failure: &WebhookFailureRecord) -> Result<(), DomainError>;

    /// Find a failure by id.
    async fn find_by_id(
        &self,
        id: &WebhookFailureId,
    ) -> Result<Option<WebhookFailureRecord>, DomainError>;

    /// Unresolved failures, oldest first.
    async fn list_unresolved(&self, limit: u32) -> Result<Vec<WebhookFailureRecord>, DomainError>;

    /// Count another failed attempt and replace the error message.
    ///
    /// # Errors
    ///
    /// - `WebhookFailureNotFound` if `id` does not exist
    async fn record_attempt(
        &self,
        id: &WebhookFailureId,
        error: &str,
        at: Timestamp,
    ) -> Result<(), DomainError>;

    /// Mark a failure as resolved.
    ///
    /// # Errors
    ///
    /// - `WebhookFailureNotFound` if `id` does not exist
    async fn mark_resolved(&self, id: &WebhookFailureId, at: Timestamp)
        -> Result<(), DomainError>;
}
