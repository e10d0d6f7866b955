// src/models/stats.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicStats {
    pub topic: String,
    pub count: u64,
    pub avg_response_time: f64,
}

/// Output of `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_interactions: u64,
    pub language_distribution: BTreeMap<String, u64>,
    pub source_distribution: BTreeMap<String, u64>,
    pub popular_topics: Vec<TopicStats>,
    pub avg_response_time: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: &'static str,
    pub nlu_enabled: bool,
    pub cache_size: usize,
    pub database: &'static str,
    /// `healthy`, or `warning` once too many addresses are banned.
    pub security: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    BlockedRequest,
    RateLimitExceeded,
    SlowRequest,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventKind::BlockedRequest => "blocked_request",
            SecurityEventKind::RateLimitExceeded => "rate_limit_exceeded",
            SecurityEventKind::SlowRequest => "slow_request",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_type: SecurityEventKind,
    pub ip: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Output of `GET /admin/security`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityStats {
    pub status: String,
    pub banned_ips_count: usize,
    pub active_rate_limits: usize,
    pub recent_events: usize,
    /// Listed only while the ban list is short.
    pub banned_ips: Vec<String>,
    pub latest_events: Vec<SecurityEvent>,
}
