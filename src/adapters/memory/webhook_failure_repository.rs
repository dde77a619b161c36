//! In-memory WebhookFailureRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, WebhookFailureId};
use crate::ports::{WebhookFailureRecord, WebhookFailureRepository};

#[derive(Default)]
pub struct InMemoryWebhookFailureRepository {
    records: RwLock<HashMap<WebhookFailureId, WebhookFailureRecord>>,
}

impl InMemoryWebhookFailureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<WebhookFailureRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

fn not_found(id: &WebhookFailureId) -> DomainError {
    DomainError::new(
        ErrorCode::WebhookFailureNotFound,
        format!("webhook failure {} not found", id),
    )
}

#[async_trait]
impl WebhookFailureRepository for InMemoryWebhookFailureRepository {
    async fn record(&self, failure: &WebhookFailureRecord) -> Result<(), DomainError> {
        self.records
            .write()
            .await
            .insert(failure.id, failure.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &WebhookFailureId,
    ) -> Result<Option<WebhookFailureRecord>, DomainError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list_unresolved(&self, limit: u32) -> Result<Vec<WebhookFailureRecord>, DomainError> {
        let records = self.records.read().await;
        let mut unresolved: Vec<WebhookFailureRecord> = records
            .values()
            .filter(|r| !r.is_resolved())
            .cloned()
            .collect();
        unresolved.sort_by_key(|r| r.created_at);
        unresolved.truncate(limit as usize);
        Ok(unresolved)
    }

    async fn record_attempt(
        &self,
        id: &WebhookFailureId,
        error: &str,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or_else(|| not_found(id))?;
        record.attempts += 1;
        record.error_message = error.to_string();
        record.last_attempt_at = at;
        Ok(())
    }

    async fn mark_resolved(
        &self,
        id: &WebhookFailureId,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(id).ok_or_else(|| not_found(id))?;
        record.resolved_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(now: Timestamp) -> WebhookFailureRecord {
        WebhookFailureRecord::new(
            "charge.success",
            serde_json::json!({"event": "charge.success", "data": {}}),
            "connection refused",
            now,
        )
    }

    #[tokio::test]
    async fn recorded_failure_is_unresolved() {
        let repo = InMemoryWebhookFailureRepository::new();
        let record = failure(Timestamp::now());
        repo.record(&record).await.unwrap();

        let unresolved = repo.list_unresolved(10).await.unwrap();

        assert_eq!(unresolved, vec![record]);
    }

    #[tokio::test]
    async fn unresolved_are_listed_oldest_first() {
        let repo = InMemoryWebhookFailureRepository::new();
        let now = Timestamp::now();
        let newer = failure(now);
        let older = failure(now.add_days(-1));
        repo.record(&newer).await.unwrap();
        repo.record(&older).await.unwrap();

        let unresolved = repo.list_unresolved(10).await.unwrap();

        assert_eq!(unresolved[0].id, older.id);
        assert_eq!(unresolved[1].id, newer.id);
    }

    #[tokio::test]
    async fn record_attempt_increments_and_replaces_error() {
        let repo = InMemoryWebhookFailureRepository::new();
        let now = Timestamp::now();
        let record = failure(now);
        repo.record(&record).await.unwrap();

        repo.record_attempt(&record.id, "still down", now.add_days(1))
            .await
            .unwrap();

        let stored = repo.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.attempts, 2);
        assert_eq!(stored.error_message, "still down");
        assert_eq!(stored.last_attempt_at, now.add_days(1));
    }

    #[tokio::test]
    async fn resolved_failures_drop_out_of_the_list() {
        let repo = InMemoryWebhookFailureRepository::new();
        let record = failure(Timestamp::now());
        repo.record(&record).await.unwrap();

        repo.mark_resolved(&record.id, Timestamp::now()).await.unwrap();

        assert!(repo.list_unresolved(10).await.unwrap().is_empty());
        assert!(repo.find_by_id(&record.id).await.unwrap().unwrap().is_resolved());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let repo = InMemoryWebhookFailureRepository::new();
        let result = repo
            .mark_resolved(&WebhookFailureId::new(), Timestamp::now())
            .await;

        assert!(matches!(result, Err(e) if e.code == ErrorCode::WebhookFailureNotFound));
    }
}
