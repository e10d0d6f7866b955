// src/models/chat.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the service answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Or,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Or];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Or => "or",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            "or" => Some(Language::Or),
            _ => None,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Where the answer text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Nlu,
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Nlu => "nlu",
            ResponseSource::Fallback => "fallback",
        }
    }

    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "nlu" => ResponseSource::Nlu,
            _ => ResponseSource::Fallback,
        }
    }
}

/// Body of `POST /chat` as it arrives on the wire, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatPayload {
    pub message: String,
    pub sender_id: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// A chat request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub sender_id: String,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub language: Language,
    pub intent: String,
    pub response_time_ms: f64,
    pub source: ResponseSource,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        for language in Language::ALL {
            assert_eq!(Language::from_code(language.code()), Some(language));
        }
        assert_eq!(Language::from_code(" HI "), Some(Language::Hi));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_payload_rejects_unknown_fields() {
        let parsed: Result<ChatPayload, _> = serde_json::from_str(
            r#"{"message": "hi", "sender_id": "u1", "language": "en", "admin": true}"#,
        );
        assert!(parsed.is_err());

        let parsed: ChatPayload =
            serde_json::from_str(r#"{"message": "hi", "sender_id": "u1"}"#).unwrap();
        assert_eq!(parsed.language, None);
    }

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ResponseSource::Nlu).unwrap(), "\"nlu\"");
        assert_eq!(serde_json::to_string(&Language::Or).unwrap(), "\"or\"");
    }
}
