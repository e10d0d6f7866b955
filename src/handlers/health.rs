// src/handlers/health.rs
use crate::models::HealthCheck;
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::get, Router};
use std::sync::Arc;

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}

async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<HealthCheck> {
    let store = state.chat.store();
    let status = match store.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, backend = store.backend(), "Interaction store ping failed");
            "degraded"
        }
    };

    Json(HealthCheck {
        status,
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        nlu_enabled: state.chat.nlu_enabled(),
        cache_size: state.chat.cache().len(),
        database: store.backend(),
        security: state.security.status(),
    })
}
