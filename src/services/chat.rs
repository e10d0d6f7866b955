// src/services/chat.rs
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::task::TaskTracker;

use crate::cache::ResponseCache;
use crate::config::Settings;
use crate::error::ChatError;
use crate::fallback::FallbackMatcher;
use crate::middleware::rate_limit::RateLimiter;
use crate::models::{ChatPayload, ChatRequest, ChatResponse, InteractionRecord, ResponseSource};
use crate::nlu_client::{accept, NluGateway, NluReply, NluResult};
use crate::rules::RulesTable;
use crate::storage::InteractionStore;
use crate::validation::{escape_html, truncate_response, validate};

/// Confidence reported for keyword-matched answers.
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

/// Answers chat messages: validation, rate limiting, NLU with keyword
/// fallback, and a detached write to the interaction log.
pub struct ChatService {
    settings: Settings,
    limiter: RateLimiter,
    matcher: FallbackMatcher,
    gateway: Option<Arc<dyn NluGateway>>,
    cache: ResponseCache,
    store: Arc<dyn InteractionStore>,
    tracker: TaskTracker,
}

struct Answer {
    text: String,
    intent: String,
    confidence: f64,
    source: ResponseSource,
}

impl ChatService {
    pub fn new(
        settings: Settings,
        store: Arc<dyn InteractionStore>,
        gateway: Option<Arc<dyn NluGateway>>,
    ) -> Self {
        let limiter = RateLimiter::new(settings.rate_limit_requests, settings.rate_limit_window);
        let cache = ResponseCache::new(settings.cache_max_entries, settings.cache_ttl);
        let matcher = FallbackMatcher::builtin(Arc::new(RulesTable::builtin()));

        Self {
            settings,
            limiter,
            matcher,
            gateway,
            cache,
            store,
            tracker: TaskTracker::new(),
        }
    }

    pub async fn handle(&self, payload: ChatPayload) -> Result<ChatResponse, ChatError> {
        let request = validate(payload, &self.settings)?;
        if let Err(e) = self.limiter.admit(&request.sender_id) {
            tracing::warn!(sender_id = %request.sender_id, "Rate limit exceeded for sender");
            return Err(e);
        }

        let started = Instant::now();
        let answer = self.answer(&request).await;
        let response_text =
            escape_html(&truncate_response(&answer.text, self.settings.max_response_length));
        let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let timestamp = Utc::now();

        self.log_interaction(InteractionRecord {
            timestamp,
            sender_id: request.sender_id.clone(),
            language: request.language,
            intent: answer.intent.clone(),
            source: answer.source,
            message_length: request.message.chars().count(),
            response_time_ms,
        });

        tracing::info!(
            language = %request.language,
            intent = %answer.intent,
            source = answer.source.as_str(),
            response_time_ms,
            "chat request answered"
        );

        Ok(ChatResponse {
            response: response_text,
            language: request.language,
            intent: answer.intent,
            response_time_ms,
            source: answer.source,
            confidence: answer.confidence,
            timestamp,
            session_id: session_id(&request.sender_id),
        })
    }

    async fn answer(&self, request: &ChatRequest) -> Answer {
        if let Some(reply) = self.cache.get(request.language, &request.message) {
            tracing::debug!(intent = %reply.intent, "response cache hit");
            return Answer::from_nlu(reply);
        }

        if let Some(reply) = self.ask_nlu(request).await {
            self.cache
                .insert(request.language, &request.message, reply.clone());
            return Answer::from_nlu(reply);
        }

        let fallback = self.matcher.matches(&request.message, request.language);
        Answer {
            text: fallback.text,
            intent: fallback.topic_key,
            confidence: FALLBACK_CONFIDENCE,
            source: ResponseSource::Fallback,
        }
    }

    async fn ask_nlu(&self, request: &ChatRequest) -> Option<NluReply> {
        let gateway = self.gateway.as_ref()?;

        let result = tokio::time::timeout(
            self.settings.nlu_timeout,
            gateway.interpret(&request.message, &request.sender_id),
        )
        .await
        .unwrap_or(NluResult::Timeout);

        match &result {
            NluResult::Timeout => {
                tracing::warn!(
                    timeout_ms = self.settings.nlu_timeout.as_millis() as u64,
                    "NLU service timed out, using fallback"
                );
            }
            NluResult::Unavailable(reason) => {
                tracing::warn!(reason = %reason, "NLU service unavailable, using fallback");
            }
            NluResult::Success { confidence, .. }
                if *confidence < self.settings.nlu_confidence_threshold =>
            {
                tracing::debug!(
                    confidence,
                    threshold = self.settings.nlu_confidence_threshold,
                    "NLU confidence below threshold, using fallback"
                );
            }
            NluResult::Success { .. } => {}
        }

        accept(result, self.settings.nlu_confidence_threshold)
    }

    fn log_interaction(&self, record: InteractionRecord) {
        let store = Arc::clone(&self.store);
        self.tracker.spawn(async move {
            if let Err(e) = store.record(&record).await {
                tracing::error!(
                    error = %e,
                    intent = %record.intent,
                    "Failed to record interaction"
                );
            }
        });
    }

    /// Waits until every interaction submitted so far has been written.
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    pub fn pending_writes(&self) -> usize {
        self.tracker.len()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn clear_cache(&self) -> usize {
        let cleared = self.cache.clear();
        tracing::info!(cleared, "response cache cleared");
        cleared
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn nlu_enabled(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn store(&self) -> &Arc<dyn InteractionStore> {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Answer {
    fn from_nlu(reply: NluReply) -> Self {
        Self {
            text: reply.text,
            intent: reply.intent,
            confidence: reply.confidence,
            source: ResponseSource::Nlu,
        }
    }
}

/// Stable per-sender conversation id: `session_` plus 8 hex chars of SHA-256.
pub fn session_id(sender_id: &str) -> String {
    let digest = hex::encode(Sha256::digest(sender_id.as_bytes()));
    format!("session_{}", &digest[..8])
}
