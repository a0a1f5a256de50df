use anyhow::Result;
use tracing::info;

use eventease_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting EventEase API v{}", env!("CARGO_PKG_VERSION"));

    let store = persistence::open_store(&config.storage)?;
    let addr = config.socket_addr()?;
    let app = app::create_app(config, store)?;

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
