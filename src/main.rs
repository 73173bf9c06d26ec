use anyhow::{Context, Result};
use lingua_api::{
    config::Config,
    db::Database,
    providers::ProviderRegistry,
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lingua_api=info".parse()?),
        )
        .init();

    info!("Starting lingua API");

    let config = Arc::new(Config::from_env()?);

    let db = Database::connect(&config.database_url).await?;
    info!("Database ready at {}", config.database_url);

    let pending = db
        .count_pending_provider_calls()
        .await
        .context("Failed to inspect provider call journal")?;
    if pending > 0 {
        warn!(
            "{} provider call(s) never completed; their results were not stored",
            pending
        );
    }

    let registry = ProviderRegistry::from_config(&config).context("Failed to set up providers")?;
    if config.api_key.is_some() {
        info!("API key required for all routes except /health");
    }

    let state = AppState::new(db, Arc::new(registry), config.clone());
    let app = server::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
