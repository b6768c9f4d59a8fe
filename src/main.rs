use anyhow::Result;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use translation_health::{
    config::Config,
    health::HealthEngine,
    server::{build_router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_health=info".parse()?),
        )
        .init();

    info!("Starting translation health engine");

    // Load configuration from environment
    let config = Config::from_env()?;

    if !config.engine_enabled {
        warn!("HEALTH_ENGINE_ENABLED is off, the engine will accept no issues");
    }
    if config.admin_api_key.is_none() {
        warn!("ADMIN_API_KEY is not set, mutating routes are unauthenticated");
    }
    info!(
        "Scoring {} locales ({}), fallback '{}'",
        config.known_locales.len(),
        config.known_locales.join(", "),
        config.fallback_locale
    );

    let engine = HealthEngine::with_heuristic(config.engine_settings(), config.heuristic());
    let state = AppState::new(
        Arc::new(engine),
        Arc::new(config.registry.clone()),
        config.admin_api_key.clone(),
    );
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
