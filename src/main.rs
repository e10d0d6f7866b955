use std::net::SocketAddr;
use std::sync::Arc;

use arogya_chat::config::Settings;
use arogya_chat::nlu_client::{HttpNluClient, NluGateway};
use arogya_chat::services::ChatService;
use arogya_chat::storage::{InteractionStore, MemoryInteractionStore, SqliteInteractionStore};
use arogya_chat::{build_app, db, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let store: Arc<dyn InteractionStore> = if settings.uses_memory_store() {
        tracing::warn!("DATABASE_URL=memory: interactions will be lost on restart");
        Arc::new(MemoryInteractionStore::new())
    } else {
        tracing::info!("Opening interaction log at {}", settings.database_url);
        let pool = db::create_pool(&settings.database_url).await?;
        Arc::new(SqliteInteractionStore::new(pool))
    };

    let gateway: Option<Arc<dyn NluGateway>> = if settings.nlu_enabled {
        match HttpNluClient::new(settings.nlu_url.clone(), settings.nlu_timeout) {
            Ok(client) => {
                tracing::info!(
                    endpoint = client.endpoint(),
                    timeout_ms = settings.nlu_timeout.as_millis() as u64,
                    threshold = settings.nlu_confidence_threshold,
                    "NLU gateway enabled"
                );
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!("Failed to build NLU client, using keyword fallback only: {}", e);
                None
            }
        }
    } else {
        tracing::info!("NLU gateway disabled. All answers come from keyword fallback.");
        None
    };

    if settings.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET not set. Admin endpoints will reject every request.");
    }

    let bind_address = settings.bind_address();
    let state = Arc::new(AppState::new(ChatService::new(settings, store, gateway)));
    let app = build_app(state.clone());

    // Sweep expired rate-limit windows and bans once per window
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_state.chat.limiter().window_duration());
        loop {
            interval.tick().await;
            let removed = sweep_state.chat.limiter().cleanup_expired()
                + sweep_state.ip_limiter.cleanup_expired();
            if removed > 0 {
                tracing::debug!(removed, "Expired rate limit entries removed");
            }
            let lifted = sweep_state.security.sweep_bans();
            if lifted > 0 {
                tracing::info!(target: "security", lifted, "Expired IP bans lifted");
            }
        }
    });

    // Run the server with ConnectInfo to provide socket addresses for rate limiting
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!(
        pending = state.chat.pending_writes(),
        "Server stopped, flushing interaction log"
    );
    state.chat.flush().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,arogya_chat=trace,sqlx=info,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,arogya_chat=info,sqlx=warn,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Arogya health chat starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Build mode: {}",
        if cfg!(debug_assertions) { "development" } else { "production" }
    );
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
