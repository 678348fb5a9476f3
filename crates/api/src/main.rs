//! Booking API server binary entrypoint.

use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use booking_common::config::AppConfig;

use booking_api::routes::create_router;
use booking_api::state::AppState;

/// Booking payloads are a few hundred bytes.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing before config so config parsing can log
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("booking_api=debug,booking_notifier=debug,booking_common=debug,tower_http=debug")
    });
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.trim() == "json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = AppConfig::from_env()?;

    tracing::info!(
        mapped_properties = config.telegram.chat_map.len(),
        smtp_port = config.smtp.port,
        webhook_enabled = config.telegram.webhook_secret.is_some(),
        "Starting booking API server..."
    );

    // Build application state
    let state = AppState::from_config(&config);

    // Build router
    let app = create_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    tracing::info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
