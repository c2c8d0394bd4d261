mod api;
mod client;
mod config;
mod message;
mod staging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::client::{LogOnlyClient, MessagingClient, RelayClient};
use crate::config::Config;
use crate::staging::Fetcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wxgate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    if config.uses_placeholder_key() {
        warn!("api.api_key is still the placeholder value; set a real secret in the config file");
    }

    let client: Arc<dyn MessagingClient> = match &config.client.relay_url {
        Some(url) => {
            info!("  Session bridge: {}", url);
            Arc::new(RelayClient::new(url))
        }
        None => {
            warn!("No client.relay_url configured, sends will only be logged");
            Arc::new(LogOnlyClient)
        }
    };

    let fetcher = Fetcher::new(config.staging.clone())?;
    info!("  Download directory: {}", fetcher.temp_dir().display());

    let state = AppState::new(client, fetcher, &config.api.api_key);

    info!("Starting external API server...");
    api::serve(&config.bind_addr(), state).await?;

    Ok(())
}
