//! PostgreSQL implementation of WebhookFailureRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, WebhookFailureId};
use crate::ports::{WebhookFailureRecord, WebhookFailureRepository};

pub struct PostgresWebhookFailureRepository {
    pool: PgPool,
}

impl PostgresWebhookFailureRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookFailureRow {
    id: Uuid,
    event_type: String,
    payload: serde_json::Value,
    error_message: String,
    attempts: i32,
    created_at: DateTime<Utc>,
    last_attempt_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl From<WebhookFailureRow> for WebhookFailureRecord {
    fn from(row: WebhookFailureRow) -> Self {
        WebhookFailureRecord {
            id: WebhookFailureId::from_uuid(row.id),
            event_type: row.event_type,
            payload: row.payload,
            error_message: row.error_message,
            attempts: u32::try_from(row.attempts).unwrap_or(0),
            created_at: Timestamp::from_datetime(row.created_at),
            last_attempt_at: Timestamp::from_datetime(row.last_attempt_at),
            resolved_at: row.resolved_at.map(Timestamp::from_datetime),
        }
    }
}

fn not_found(id: &WebhookFailureId) -> DomainError {
    DomainError::new(
        ErrorCode::WebhookFailureNotFound,
        format!("Webhook failure {} not found", id),
    )
}

#[async_trait]
impl WebhookFailureRepository for PostgresWebhookFailureRepository {
    async fn record(&self, failure: &WebhookFailureRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO webhook_failures (
                id, event_type, payload, error_message, attempts,
                created_at, last_attempt_at, resolved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(failure.id.as_uuid())
        .bind(&failure.event_type)
        .bind(&failure.payload)
        .bind(&failure.error_message)
        .bind(i32::try_from(failure.attempts).unwrap_or(i32::MAX))
        .bind(failure.created_at.as_datetime())
        .bind(failure.last_attempt_at.as_datetime())
        .bind(failure.resolved_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record webhook failure: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &WebhookFailureId,
    ) -> Result<Option<WebhookFailureRecord>, DomainError> {
        let row: Option<WebhookFailureRow> = sqlx::query_as(
            r#"
            SELECT id, event_type, payload, error_message, attempts,
                   created_at, last_attempt_at, resolved_at
            FROM webhook_failures
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find webhook failure: {}", e)))?;

        Ok(row.map(WebhookFailureRecord::from))
    }

    async fn list_unresolved(&self, limit: u32) -> Result<Vec<WebhookFailureRecord>, DomainError> {
        let rows: Vec<WebhookFailureRow> = sqlx::query_as(
            r#"
            SELECT id, event_type, payload, error_message, attempts,
                   created_at, last_attempt_at, resolved_at
            FROM webhook_failures
            WHERE resolved_at IS NULL
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(format!("Failed to list webhook failures: {}", e))
        })?;

        Ok(rows.into_iter().map(WebhookFailureRecord::from).collect())
    }

    async fn record_attempt(
        &self,
        id: &WebhookFailureId,
        error: &str,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE webhook_failures SET
                attempts = attempts + 1,
                error_message = $2,
                last_attempt_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(error)
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record attempt: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn mark_resolved(
        &self,
        id: &WebhookFailureId,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE webhook_failures SET resolved_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to resolve webhook failure: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_converts_to_record() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let record = WebhookFailureRecord::from(WebhookFailureRow {
            id,
            event_type: "invoice.update".to_string(),
            payload: serde_json::json!({"event": "invoice.update"}),
            error_message: "timeout".to_string(),
            attempts: 3,
            created_at: now,
            last_attempt_at: now,
            resolved_at: None,
        });

        assert_eq!(record.id.as_uuid(), &id);
        assert_eq!(record.attempts, 3);
        assert!(!record.is_resolved());
    }
}
