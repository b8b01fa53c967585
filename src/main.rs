use claila_relay::{
    config::Config,
    routes,
    services::{claila::ClailaClient, relay::ChatRelay},
    state::AppState,
};
use anyhow::Context;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(?config, "starting Claila relay");

    let client = ClailaClient::new(&config.upstream_base_url, config.upstream_timeout)?;
    let state = Arc::new(AppState::new(ChatRelay::new(client, config.response_shape)));

    let cors = CorsLayer::very_permissive();

    let app = routes::create_router(&config.models)
        .with_state(state)
        .layer(cors);

    let (host, port) = config.bind_addr();
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("cannot bind to {host}:{port}"))?;

    info!("Claila proxy server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
