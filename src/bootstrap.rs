use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::CirclescanConfig;
use crate::reader::CircleReader;
use crate::registry::{serve_registry, RegistryState};

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Configure API port from environment variables
    let port = dotenvy::var("API_PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = TcpListener::bind(&format!("0.0.0.0:{port}")).await?;

    let config = CirclescanConfig::from_env()?;
    let circles_file = config.circles_file.clone();
    info!(
        chain = %config.chain,
        circles_file = %circles_file.display(),
        "Loaded configuration"
    );

    let reader = Arc::new(CircleReader::new(config)?);

    // Start the API server
    serve_registry(listener, RegistryState::new(reader, circles_file)).await?;

    Ok(())
}
