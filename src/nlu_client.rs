// src/nlu_client.rs
//! Client side of the external NLU/dialogue service.
//!
//! The service is a black box: we POST `{text, sender_id}` and expect
//! `{intent, confidence, text}` back. Anything else (non-2xx, timeout, bad
//! JSON, empty text) is reported as unavailable and the caller falls back to
//! keyword matching. Errors never leave this module as `Err`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Intent reported when the service answers without naming one.
pub const UNNAMED_INTENT: &str = "rasa_processed";

#[derive(Debug, Clone, PartialEq)]
pub enum NluResult {
    Success {
        intent: String,
        confidence: f64,
        text: String,
    },
    Unavailable(String),
    Timeout,
}

/// An NLU answer that is good enough to show to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct NluReply {
    pub intent: String,
    pub confidence: f64,
    pub text: String,
}

/// Decides between the NLU answer and the fallback: only a `Success` with
/// confidence at or above `threshold` is accepted.
pub fn accept(result: NluResult, threshold: f64) -> Option<NluReply> {
    match result {
        NluResult::Success {
            intent,
            confidence,
            text,
        } if confidence >= threshold && !text.trim().is_empty() => Some(NluReply {
            intent,
            confidence,
            text,
        }),
        _ => None,
    }
}

#[async_trait]
pub trait NluGateway: Send + Sync {
    async fn interpret(&self, text: &str, sender_id: &str) -> NluResult;
}

#[derive(Debug, Serialize)]
struct InterpretRequest<'a> {
    text: &'a str,
    sender_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct InterpretResponse {
    #[serde(default)]
    intent: Option<String>,
    confidence: f64,
    text: String,
}

#[derive(Debug, Clone)]
pub struct HttpNluClient {
    client: Client,
    endpoint: String,
}

impl HttpNluClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NluGateway for HttpNluClient {
    async fn interpret(&self, text: &str, sender_id: &str) -> NluResult {
        let response = match self
            .client
            .post(&self.endpoint)
            .json(&InterpretRequest { text, sender_id })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return NluResult::Timeout,
            Err(e) => return NluResult::Unavailable(format!("NLU request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            return NluResult::Unavailable(format!("NLU service returned {}", status));
        }

        match response.json::<InterpretResponse>().await {
            Ok(body) if body.text.trim().is_empty() => {
                NluResult::Unavailable("NLU service returned an empty reply".to_string())
            }
            Ok(body) => NluResult::Success {
                intent: body
                    .intent
                    .filter(|intent| !intent.trim().is_empty())
                    .unwrap_or_else(|| UNNAMED_INTENT.to_string()),
                confidence: body.confidence,
                text: body.text,
            },
            Err(e) if e.is_timeout() => NluResult::Timeout,
            Err(e) => NluResult::Unavailable(format!("Failed to parse NLU response: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(confidence: f64) -> NluResult {
        NluResult::Success {
            intent: "ask_malaria".to_string(),
            confidence,
            text: "Use a mosquito net.".to_string(),
        }
    }

    #[test]
    fn test_accept_above_threshold() {
        let reply = accept(success(0.91), 0.7).unwrap();
        assert_eq!(reply.intent, "ask_malaria");
        assert_eq!(reply.confidence, 0.91);
    }

    #[test]
    fn test_accept_at_threshold() {
        assert!(accept(success(0.7), 0.7).is_some());
    }

    #[test]
    fn test_reject_low_confidence_and_failures() {
        assert!(accept(success(0.4), 0.7).is_none());
        assert!(accept(NluResult::Timeout, 0.0).is_none());
        assert!(accept(NluResult::Unavailable("down".into()), 0.0).is_none());
    }

    #[test]
    fn test_reject_blank_text() {
        let blank = NluResult::Success {
            intent: "greet".to_string(),
            confidence: 0.99,
            text: "  ".to_string(),
        };
        assert!(accept(blank, 0.5).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // port 9 (discard) on localhost is closed in test environments
        let client =
            HttpNluClient::new("http://127.0.0.1:9/webhooks/nlu".to_string(), Duration::from_secs(2))
                .unwrap();
        let result = client.interpret("hello", "u1").await;
        assert!(matches!(result, NluResult::Unavailable(_) | NluResult::Timeout));
    }

    #[test]
    fn test_response_body_intent_is_optional() {
        let body: InterpretResponse =
            serde_json::from_str(r#"{"confidence": 0.8, "text": "hi"}"#).unwrap();
        assert_eq!(body.intent, None);
        assert!(serde_json::from_str::<InterpretResponse>(r#"{"text": "hi"}"#).is_err());
    }
}
