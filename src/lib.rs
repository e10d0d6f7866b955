// lib.rs - Health chat service: routes, shared state and the modules behind them
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod fallback;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod nlu_client;
pub mod rules;
pub mod security;
pub mod services;
pub mod storage;
pub mod validation;

use axum::{
    http::{HeaderValue, Method},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Settings;
use crate::middleware::rate_limit::RateLimiter;
use crate::security::SecurityMonitor;
use crate::services::ChatService;

// AppState owns the chat pipeline plus the per-IP limiter and ban list in front of it
pub struct AppState {
    pub chat: ChatService,
    pub ip_limiter: RateLimiter,
    pub security: SecurityMonitor,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        let settings = chat.settings();
        let ip_limiter =
            RateLimiter::new(settings.ip_rate_limit_requests, settings.rate_limit_window);
        let security = SecurityMonitor::new(settings.ip_ban_duration);
        Self {
            chat,
            ip_limiter,
            security,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.chat.settings()
    }
}

/// Builds the application router with every route, middleware and the shared state.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.settings());

    Router::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::chat::chat_routes())
        .merge(handlers::stats::stats_routes())
        .merge(handlers::admin::admin_routes())
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(cors)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(Extension(state))
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    if settings.debug {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = settings
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
}
