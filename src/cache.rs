// src/cache.rs
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::fallback::normalize_text;
use crate::models::Language;
use crate::nlu_client::NluReply;

#[derive(Debug, Clone)]
struct CacheEntry {
    reply: NluReply,
    stored_at: Instant,
    last_access: Instant,
}

/// Bounded cache of NLU replies keyed by language and normalized message.
///
/// Entries older than the TTL are treated as missing. When full, the least
/// recently read entry is evicted.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<(Language, String), CacheEntry>>,
    max_entries: usize,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
            ttl,
        }
    }

    fn key(language: Language, message: &str) -> (Language, String) {
        (language, normalize_text(message))
    }

    pub fn get(&self, language: Language, message: &str) -> Option<NluReply> {
        self.get_at(language, message, Instant::now())
    }

    pub fn get_at(&self, language: Language, message: &str, now: Instant) -> Option<NluReply> {
        let key = Self::key(language, message);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let expired = match entries.get_mut(&key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                entry.last_access = now;
                return Some(entry.reply.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(&key);
        }
        None
    }

    pub fn insert(&self, language: Language, message: &str, reply: NluReply) {
        self.insert_at(language, message, reply, Instant::now())
    }

    pub fn insert_at(&self, language: Language, message: &str, reply: NluReply, now: Instant) {
        if self.max_entries == 0 {
            return;
        }
        let key = Self::key(language, message);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                reply,
                stored_at: now,
                last_access: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let cleared = entries.len();
        entries.clear();
        cleared
    }
}
