// src/validation.rs
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Settings;
use crate::error::ChatError;
use crate::models::{ChatPayload, ChatRequest, Language};

lazy_static! {
    static ref SENDER_ID: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid sender id pattern");
    static ref SUSPICIOUS_PATTERNS: Vec<Regex> = [
        r"(?i)<script[^>]*>",
        r"(?i)javascript:",
        r"(?i)\bon\w+\s*=",
        r"(?i)<iframe[^>]*>",
        r"(?i)\beval\s*\(",
        r"(?i)\bdocument\.(cookie|write|location)",
        r"(?i)\bwindow\.(location|open)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid suspicious content pattern"))
    .collect();
}

/// Checks a raw chat payload and turns it into a [`ChatRequest`].
pub fn validate(payload: ChatPayload, settings: &Settings) -> Result<ChatRequest, ChatError> {
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ChatError::InvalidInput("Message must not be empty".to_string()));
    }
    if message.chars().count() > settings.max_message_length {
        return Err(ChatError::InvalidInput(format!(
            "Message too long. Maximum {} characters allowed",
            settings.max_message_length
        )));
    }
    if message
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(ChatError::InvalidInput(
            "Message contains control characters".to_string(),
        ));
    }
    if SUSPICIOUS_PATTERNS.iter().any(|re| re.is_match(message)) {
        return Err(ChatError::InvalidInput(
            "Message contains potentially harmful content".to_string(),
        ));
    }

    let sender_id = payload.sender_id.trim();
    if sender_id.is_empty() || sender_id.chars().count() > settings.max_sender_id_length {
        return Err(ChatError::InvalidInput(format!(
            "sender_id must be 1 to {} characters",
            settings.max_sender_id_length
        )));
    }
    if !SENDER_ID.is_match(sender_id) {
        return Err(ChatError::InvalidInput(
            "sender_id may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }

    let language = match payload.language.as_deref() {
        None => Language::default(),
        Some(code) => Language::from_code(code).ok_or_else(|| {
            ChatError::InvalidInput(format!(
                "Unsupported language '{}'. Use en, hi or or",
                code
            ))
        })?,
    };

    Ok(ChatRequest {
        message: message.to_string(),
        sender_id: sender_id.to_string(),
        language,
    })
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_response(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// Escapes text for safe embedding in HTML. Applied to every outgoing answer.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
