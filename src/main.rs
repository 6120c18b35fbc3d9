use std::sync::Arc;

use quantum_trade::config::Config;
use quantum_trade::services::{default_registry, restore_registry};
use quantum_trade::{api, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quantum_trade=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Starting Quantum Trade server on {}:{}",
        config.host, config.port
    );

    // Learning state survives restarts when a path is configured
    let registry = Arc::new(default_registry(config.scorer));
    if let Some(ref path) = config.learning_state_path {
        restore_registry(&registry, path);
    }

    let addr = config.bind_address();
    let state = AppState::with_registry(config, registry);
    let app = api::app(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Quantum Trade server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.persist_learning().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
