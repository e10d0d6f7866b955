// src/models/mod.rs
pub mod auth;
pub mod chat;
pub mod interaction;
pub mod stats;

pub use chat::{ChatPayload, ChatRequest, ChatResponse, Language, ResponseSource};
pub use interaction::InteractionRecord;
pub use stats::{
    HealthCheck, SecurityEvent, SecurityEventKind, SecurityStats, StatsSummary, TopicStats,
};
