use anyhow::Result;
use db::DBService;
use server::{AppState, config::ServerConfig, routes};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    let db = DBService::new().await?;
    let state = AppState::new(db, config.clone());

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "runlog server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
