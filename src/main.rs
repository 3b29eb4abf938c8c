use anyhow::Result;
use arbitrage_keeper::{config::AppConfig, cycle::AppContext, server, utils};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    let port = config.port;
    tracing::info!(
        endpoints = config.endpoints.len(),
        pairs = config.pairs.len(),
        exchanges = config.exchanges.len(),
        "[INIT] arbitrage-keeper starting"
    );

    let ctx = Arc::new(AppContext::initialize(config)?);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "[INIT] listening for trigger requests");
    axum::serve(listener, server::router(ctx)).await?;
    Ok(())
}
