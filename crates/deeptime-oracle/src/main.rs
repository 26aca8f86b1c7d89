//! Standalone oracle server.
//!
//! Reads `deeptime-config.yaml` (or the path in `DEEPTIME_CONFIG`) for the
//! port and rate limit, then serves until killed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use deeptime_core::config::SimulationConfig;
use deeptime_oracle::rate_limit::RateLimiter;
use deeptime_oracle::{AppState, ServerConfig, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("DEEPTIME_CONFIG")
        .map_or_else(|_| PathBuf::from("deeptime-config.yaml"), PathBuf::from);
    let config = SimulationConfig::load_or_default(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    let limiter = RateLimiter::new(
        config.oracle.rate_limit_max_requests,
        Duration::from_secs(config.oracle.rate_limit_window_secs),
    );
    let state = Arc::new(AppState::new(limiter));

    info!(port = config.oracle.port, "Deep Time oracle starting");
    start_server(
        &ServerConfig {
            host: String::from("0.0.0.0"),
            port: config.oracle.port,
        },
        state,
    )
    .await?;
    Ok(())
}
