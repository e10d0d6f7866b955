// src/storage/memory.rs
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{InteractionStore, StoreError};
use crate::models::InteractionRecord;

/// Process-local interaction log, lost on restart. Selected with `DATABASE_URL=memory`.
#[derive(Debug, Default)]
pub struct MemoryInteractionStore {
    records: RwLock<Vec<InteractionRecord>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn record(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<InteractionRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
