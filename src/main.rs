// src/main.rs
//! Order report service entrypoint: boots the Axum HTTP server, wiring the
//! ledger, engine config, and routes.

use std::sync::Arc;

use labor_order_analyzer::api::{create_router, AppState};
use labor_order_analyzer::config::EngineConfig;
use labor_order_analyzer::ledger::Ledger;
use labor_order_analyzer::metrics::Metrics;
use labor_order_analyzer::storage::JsonFileStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR ORDERS_ENV in {local, development, dev})
///   - ORDERS_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("ORDERS_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("ORDERS_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ingest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let config = Arc::new(EngineConfig::load_default()?);
    let store = Arc::new(JsonFileStore::new(&config.ledger_path));
    let ledger = Arc::new(Ledger::open(store)?);

    let metrics = Metrics::init();

    let state = AppState {
        ledger,
        config: config.clone(),
    };
    let router = create_router(state).merge(metrics.router());

    let bind = std::env::var("ORDERS_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, "order report service listening");
    axum::serve(listener, router).await?;
    Ok(())
}
