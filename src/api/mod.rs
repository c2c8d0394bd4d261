//! HTTP surface: one POST endpoint per message kind.

mod body;
mod error;
mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::post, Router};
use tracing::info;

use body::RequestBody;
use error::ApiError;

use crate::client::MessagingClient;
use crate::staging::Fetcher;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    client: Arc<dyn MessagingClient>,
    fetcher: Arc<Fetcher>,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(client: Arc<dyn MessagingClient>, fetcher: Fetcher, api_key: &str) -> Self {
        Self {
            client,
            fetcher: Arc::new(fetcher),
            api_key: Arc::from(api_key),
        }
    }

    /// Exact match against the configured secret. Runs before any other check.
    fn authorize(&self, body: &RequestBody) -> Result<(), ApiError> {
        match body.str_field("api_key") {
            Some(key) if key == &*self.api_key => Ok(()),
            _ => Err(ApiError::Unauthorized),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/send_text", post(handlers::send_text))
        .route("/send_image", post(handlers::send_image))
        .route("/send_file", post(handlers::send_file))
        .route("/send_video", post(handlers::send_video))
        .route("/send_card", post(handlers::send_card))
        .route("/send_link", post(handlers::send_link))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(
        "API server listening on http://{} (client: {})",
        addr,
        state.client.name()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, stopping API server...");
        })
        .await
        .context("Server error")?;

    Ok(())
}
