// src/handlers/chat.rs
use crate::error::ChatError;
use crate::middleware::rate_limit::ip_rate_limit_middleware;
use crate::models::{ChatPayload, ChatResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Extension},
    response::Json,
    routing::post,
    Router,
};
use std::sync::Arc;

/// Upper bound on a chat request body; well above the longest valid message.
const CHAT_BODY_LIMIT: usize = 16 * 1024;

pub fn chat_routes() -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/api/chat", post(chat))
        .layer(DefaultBodyLimit::max(CHAT_BODY_LIMIT))
        .layer(axum::middleware::from_fn(ip_rate_limit_middleware))
}

async fn chat(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    // Malformed bodies are client errors like any other validation failure
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("Rejected chat body: {}", rejection.body_text());
        ChatError::InvalidInput(rejection.body_text())
    })?;

    let response = state.chat.handle(payload).await?;
    Ok(Json(response))
}
