// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contabil API Server
//!
//! Backend for the accounting firm's website: service catalogue, contact
//! form, testimonials and staff accounts.

use contabil_api::{config::Config, db::Db, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.storage_backend,
        "Starting Contabil API"
    );

    let db = Db::from_config(&config).await?;
    tracing::info!(
        max_requests = config.rate_limit_max_requests,
        window_ms = config.rate_limit_window_ms,
        "Admission limiter configured"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config, db));
    let app = contabil_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,contabil_api=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
