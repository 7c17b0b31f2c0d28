use std::sync::Arc;

use anilist_compare::{
    api::{create_router, AppState},
    config::Config,
    services::providers::AniListProvider,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("anilist_compare=info,tower_http=info")),
        )
        .init();

    let provider = AniListProvider::new(config.anilist_api_url.clone(), config.request_timeout())?;
    let state = AppState::from_config(&config, Arc::new(provider));

    // Create the router with all routes
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        max_concurrent_requests = config.max_concurrent_requests,
        "Server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
