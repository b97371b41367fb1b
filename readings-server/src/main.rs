use anyhow::Context;
use readings_server::config::{DEFAULT_CONFIG_PATH, ServiceConfig};
use readings_server::router::{AppState, build_router};
use readings_server::{logging, source};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ServiceConfig::load(&config_path)?;

    // Initialize logging
    let _logging_guard = logging::init_logging(&config.log_dir, "readings-server", &config.log_level)?;

    info!("Readings server starting...");
    for name in config.ignored_overrides(|key| std::env::var(key).ok()) {
        tracing::warn!("{} is set but has no effect with the configured sheet source", name);
    }
    info!("Lookup settings: {:?}", config.lookup);

    let source = source::from_config(&config.source)?;
    let state = AppState::new(config.lookup.clone(), source);
    let app = build_router(state, &config.server);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving /sheet-data on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Readings server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
