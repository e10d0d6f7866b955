// src/storage/mod.rs
//! Interaction log. Writes are append-only; there is no update or delete path.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::InteractionRecord;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryInteractionStore;
pub use sqlite::SqliteInteractionStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn record(&self, record: &InteractionRecord) -> Result<(), StoreError>;

    /// Every stored record, oldest first.
    async fn load_all(&self) -> Result<Vec<InteractionRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}
