// src/handlers/stats.rs
use crate::error::ChatError;
use crate::models::StatsSummary;
use crate::services::stats;
use crate::AppState;
use axum::{extract::Extension, response::Json, routing::get, Router};
use std::sync::Arc;

pub fn stats_routes() -> Router {
    Router::new().route("/stats", get(get_stats))
}

async fn get_stats(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<StatsSummary>, ChatError> {
    let summary = stats::collect(state.chat.store().as_ref()).await?;
    Ok(Json(summary))
}
