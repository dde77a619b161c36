//! In-memory PaymentHistoryRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::billing::PaymentRecord;
use crate::domain::foundation::DomainError;
use crate::ports::{PaymentHistoryRepository, SaveResult};

/// Payments keyed by reference, so a repeated reference is a no-op.
#[derive(Default)]
pub struct InMemoryPaymentHistoryRepository {
    records: RwLock<HashMap<String, PaymentRecord>>,
}

impl InMemoryPaymentHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn all(&self) -> Vec<PaymentRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl PaymentHistoryRepository for InMemoryPaymentHistoryRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.payment_reference) {
            Ok(SaveResult::AlreadyExists)
        } else {
            records.insert(record.payment_reference.clone(), record.clone());
            Ok(SaveResult::Inserted)
        }
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self.records.read().await.get(reference).cloned())
    }
}
