// src/handlers/admin.rs
use crate::middleware::admin::admin_middleware;
use crate::middleware::auth::auth_middleware;
use crate::models::auth::{AdminAck, Claims};
use crate::models::SecurityStats;
use crate::AppState;
use axum::{
    extract::Extension,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn admin_routes() -> Router {
    Router::new()
        .route("/admin/cache/clear", post(clear_cache))
        .route("/admin/security", get(security_stats))
        .route("/admin/security/bans/clear", post(clear_bans))
        .layer(axum::middleware::from_fn(admin_middleware))
        .layer(axum::middleware::from_fn(auth_middleware))
}

async fn clear_cache(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Json<AdminAck> {
    let cleared = state.chat.clear_cache();
    tracing::info!(operator = %claims.sub, cleared, "Response cache cleared by admin");

    Json(AdminAck {
        success: true,
        message: "Response cache cleared".to_string(),
        cleared,
    })
}

async fn security_stats(Extension(state): Extension<Arc<AppState>>) -> Json<SecurityStats> {
    Json(state.security.stats(state.ip_limiter.tracked_clients()))
}

async fn clear_bans(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Json<AdminAck> {
    let cleared = state.security.clear_bans();
    tracing::warn!(target: "security", operator = %claims.sub, cleared, "Banned IPs cleared by admin");

    Json(AdminAck {
        success: true,
        message: "Banned IPs cleared".to_string(),
        cleared,
    })
}
