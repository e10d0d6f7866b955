// src/storage/sqlite.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{InteractionStore, StoreError};
use crate::models::{InteractionRecord, Language, ResponseSource};

type InteractionRow = (DateTime<Utc>, String, String, String, String, i64, f64);

#[derive(Debug, Clone)]
pub struct SqliteInteractionStore {
    pool: SqlitePool,
}

impl SqliteInteractionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn record_from_row(row: InteractionRow) -> Result<InteractionRecord, StoreError> {
    let (timestamp, sender_id, language, intent, source, message_length, response_time_ms) = row;
    let language = Language::from_code(&language)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown language '{}'", language)))?;
    Ok(InteractionRecord {
        timestamp,
        sender_id,
        language,
        intent,
        source: ResponseSource::from_str_lossy(&source),
        message_length: message_length.max(0) as usize,
        response_time_ms,
    })
}

#[async_trait]
impl InteractionStore for SqliteInteractionStore {
    async fn record(&self, record: &InteractionRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_interactions (
                timestamp, sender_id, language, intent, source, message_length, response_time_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.timestamp)
        .bind(&record.sender_id)
        .bind(record.language.code())
        .bind(&record.intent)
        .bind(record.source.as_str())
        .bind(record.message_length as i64)
        .bind(record.response_time_ms)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            intent = %record.intent,
            language = %record.language,
            "interaction recorded"
        );
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<InteractionRecord>, StoreError> {
        let rows: Vec<InteractionRow> = sqlx::query_as(
            r#"
            SELECT timestamp, sender_id, language, intent, source, message_length, response_time_ms
            FROM user_interactions
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        // A bad row is skipped so one corrupt entry cannot take /stats down
        let records = rows
            .into_iter()
            .filter_map(|row| match record_from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping corrupt interaction row");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn record(intent: &str, language: Language, ms: f64) -> InteractionRecord {
        InteractionRecord {
            timestamp: Utc::now(),
            sender_id: "tester".to_string(),
            language,
            intent: intent.to_string(),
            source: ResponseSource::Fallback,
            message_length: 14,
            response_time_ms: ms,
        }
    }

    #[tokio::test]
    async fn test_record_and_load_round_trip_in_order() {
        let pool = db::create_pool("sqlite::memory:").await.unwrap();
        let store = SqliteInteractionStore::new(pool);

        store
            .record(&record("fever_management", Language::En, 3.5))
            .await
            .unwrap();
        store
            .record(&record("vector_borne_diseases", Language::Or, 1.25))
            .await
            .unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].intent, "fever_management");
        assert_eq!(records[1].language, Language::Or);
        assert_eq!(records[1].response_time_ms, 1.25);
        assert_eq!(records[1].message_length, 14);
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_load_all_skips_corrupt_rows() {
        let pool = db::create_pool("sqlite::memory:").await.unwrap();
        let store = SqliteInteractionStore::new(pool);

        store
            .record(&record("fever_management", Language::En, 2.0))
            .await
            .unwrap();
        sqlx::query(
            r#"
            INSERT INTO user_interactions (
                timestamp, sender_id, language, intent, source, message_length, response_time_ms
            ) VALUES (?, 'legacy', 'fr', 'greeting', 'fallback', 5, 1.0)
            "#,
        )
        .bind(Utc::now())
        .execute(store.pool())
        .await
        .unwrap();
        store
            .record(&record("greeting", Language::Hi, 4.0))
            .await
            .unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].intent, "fever_management");
        assert_eq!(records[1].language, Language::Hi);
    }

    #[test]
    fn test_unknown_language_row_is_corrupt() {
        let row: InteractionRow = (
            Utc::now(),
            "x".into(),
            "fr".into(),
            "greeting".into(),
            "fallback".into(),
            1,
            0.0,
        );
        assert!(matches!(record_from_row(row), Err(StoreError::Corrupt(_))));
    }
}
