//! HTTP boundary: one analysis per request, no state kept between requests.

pub mod handlers;

use crate::config::ModmapConfig;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn app(config: ModmapConfig) -> Router {
    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .with_state(Arc::new(config))
}

pub async fn serve(addr: &str, config: ModmapConfig) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(config))
        .await
        .context("HTTP server terminated")
}
