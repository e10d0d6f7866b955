// src/models/interaction.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::{Language, ResponseSource};

/// One answered chat request, as kept for analytics. The message text itself is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub sender_id: String,
    pub language: Language,
    pub intent: String,
    pub source: ResponseSource,
    pub message_length: usize,
    pub response_time_ms: f64,
}
