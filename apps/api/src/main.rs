mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod roast;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; missing secrets stop the process here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roaster API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the roast store once; every request shares it
    let store = store::connect(&config.store)
        .await
        .context("Failed to initialize roast store")?;

    // Initialize LLM client
    let llm = LlmClient::new(&config.generation).context("Failed to build HTTP client")?;
    info!(
        "LLM client initialized (provider: {:?}, model: {})",
        config.generation.provider,
        llm.model()
    );

    let state = AppState {
        store,
        llm,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
