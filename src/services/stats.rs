// src/services/stats.rs
use std::collections::{BTreeMap, HashMap};

use crate::models::{InteractionRecord, StatsSummary, TopicStats};
use crate::storage::{InteractionStore, StoreError};

/// Number of topics reported in `popular_topics`.
pub const POPULAR_TOPICS_LIMIT: usize = 10;

/// Aggregates a snapshot of the interaction log. Pure: the same input
/// always gives the same summary.
pub fn summarize(records: &[InteractionRecord]) -> StatsSummary {
    let mut language_distribution: BTreeMap<String, u64> = BTreeMap::new();
    let mut source_distribution: BTreeMap<String, u64> = BTreeMap::new();
    let mut topics: HashMap<&str, (u64, f64)> = HashMap::new();
    let mut total_time = 0.0;

    for record in records {
        *language_distribution
            .entry(record.language.code().to_string())
            .or_default() += 1;
        *source_distribution
            .entry(record.source.as_str().to_string())
            .or_default() += 1;

        let topic = topics.entry(record.intent.as_str()).or_insert((0, 0.0));
        topic.0 += 1;
        topic.1 += record.response_time_ms;

        total_time += record.response_time_ms;
    }

    let mut popular_topics: Vec<TopicStats> = topics
        .into_iter()
        .map(|(topic, (count, time))| TopicStats {
            topic: topic.to_string(),
            count,
            avg_response_time: round2(time / count as f64),
        })
        .collect();
    popular_topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
    popular_topics.truncate(POPULAR_TOPICS_LIMIT);

    let total_interactions = records.len() as u64;
    let avg_response_time = if records.is_empty() {
        0.0
    } else {
        round2(total_time / records.len() as f64)
    };

    StatsSummary {
        total_interactions,
        language_distribution,
        source_distribution,
        popular_topics,
        avg_response_time,
    }
}

/// Reads the whole log and summarizes it.
pub async fn collect(store: &dyn InteractionStore) -> Result<StatsSummary, StoreError> {
    let records = store.load_all().await?;
    Ok(summarize(&records))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, ResponseSource};
    use crate::storage::MemoryInteractionStore;
    use chrono::Utc;

    fn record(intent: &str, language: Language, source: ResponseSource, ms: f64) -> InteractionRecord {
        InteractionRecord {
            timestamp: Utc::now(),
            sender_id: "stats_user".to_string(),
            language,
            intent: intent.to_string(),
            source,
            message_length: 10,
            response_time_ms: ms,
        }
    }

    #[test]
    fn test_empty_log() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_interactions, 0);
        assert!(summary.language_distribution.is_empty());
        assert!(summary.popular_topics.is_empty());
        assert_eq!(summary.avg_response_time, 0.0);
    }

    #[test]
    fn test_distributions_and_averages() {
        let records = vec![
            record("fever_management", Language::En, ResponseSource::Fallback, 10.0),
            record("fever_management", Language::Hi, ResponseSource::Fallback, 20.0),
            record("ask_malaria", Language::Or, ResponseSource::Nlu, 3.333),
        ];
        let summary = summarize(&records);

        assert_eq!(summary.total_interactions, 3);
        assert_eq!(summary.language_distribution.get("en"), Some(&1));
        assert_eq!(summary.language_distribution.get("hi"), Some(&1));
        assert_eq!(summary.language_distribution.get("or"), Some(&1));
        assert_eq!(summary.source_distribution.get("fallback"), Some(&2));
        assert_eq!(summary.source_distribution.get("nlu"), Some(&1));

        assert_eq!(summary.popular_topics[0].topic, "fever_management");
        assert_eq!(summary.popular_topics[0].count, 2);
        assert_eq!(summary.popular_topics[0].avg_response_time, 15.0);
        assert_eq!(summary.popular_topics[1].avg_response_time, 3.33);
        assert_eq!(summary.avg_response_time, 11.11);
    }

    #[test]
    fn test_topics_sorted_by_count_then_name_and_capped() {
        let mut records = Vec::new();
        for i in 0..12 {
            records.push(record(&format!("topic_{:02}", i), Language::En, ResponseSource::Fallback, 1.0));
        }
        records.push(record("topic_11", Language::En, ResponseSource::Fallback, 1.0));

        let summary = summarize(&records);
        assert_eq!(summary.popular_topics.len(), POPULAR_TOPICS_LIMIT);
        assert_eq!(summary.popular_topics[0].topic, "topic_11");
        assert_eq!(summary.popular_topics[1].topic, "topic_00");
        assert_eq!(summary.popular_topics[9].topic, "topic_08");
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let records = vec![
            record("greeting", Language::En, ResponseSource::Fallback, 1.5),
            record("headache", Language::Or, ResponseSource::Fallback, 2.5),
            record("greeting", Language::Hi, ResponseSource::Nlu, 0.5),
        ];
        let first = summarize(&records);
        let second = summarize(&records);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_collect_reads_store() {
        let store = MemoryInteractionStore::new();
        store
            .record(&record("vaccination", Language::Hi, ResponseSource::Fallback, 4.0))
            .await
            .unwrap();
        let summary = collect(&store).await.unwrap();
        assert_eq!(summary.total_interactions, 1);
        assert_eq!(summary.popular_topics[0].topic, "vaccination");
    }
}
