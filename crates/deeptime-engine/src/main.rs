//! Headless engine for the Deep Time simulation.
//!
//! Wires configuration, the oracle (embedded or remote), the save slot,
//! and the play session together, then runs the configured script.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `deeptime-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Start the embedded oracle, or point at a remote one
//! 4. Load the save slot, or create a fresh world
//! 5. Run the script
//! 6. Save the slot and log the result

mod error;
mod oracle_client;
mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use deeptime_core::config::SimulationConfig;
use deeptime_core::persistence::{load_slot, save_slot};
use deeptime_oracle::rate_limit::RateLimiter;
use deeptime_oracle::{AppState, ServerConfig, spawn_oracle};
use deeptime_types::GameState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::oracle_client::OracleClient;
use crate::session::Session;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the run itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        seed = config.world.seed,
        years_per_second = config.world.years_per_second,
        speed = config.world.speed,
        ticks = config.script.ticks,
        "deeptime-engine starting"
    );

    // 3. Oracle.
    let (oracle_handle, oracle_url) = start_oracle(&config).await?;
    let client = OracleClient::new(
        &oracle_url,
        Duration::from_millis(config.oracle.request_timeout_ms),
    )
    .map_err(EngineError::from)?;
    info!(url = client.base_url(), "Oracle client ready");

    // 4. World state.
    let persistence = &config.persistence;
    let state = if let Some(state) = load_slot(&persistence.save_dir, &persistence.slot)
        .map_err(EngineError::from)?
    {
        info!(slot = %persistence.slot, time_years = state.time_years, "Resuming saved world");
        state
    } else {
        let mut state = GameState::new(config.world.seed);
        state.difficulty.ascension_level = config.world.ascension_level;
        info!(seed = state.seed, "Fresh world created");
        state
    };

    // 5. Run.
    let mut session = Session::new(state, client);
    let summary = session.run(&config).await?;

    // 6. Save and report.
    save_slot(&persistence.save_dir, &persistence.slot, session.state())
        .map_err(EngineError::from)?;
    for entry in session.timeline().iter().take(10).rev() {
        info!(entry = %entry, "timeline");
    }
    info!(
        ticks = summary.ticks,
        time_years = summary.time_years,
        events = summary.events_triggered,
        interventions = summary.interventions_applied,
        colonies = summary.colonies_launched,
        eras = ?summary.eras,
        won = summary.won,
        "deeptime-engine run complete"
    );

    if let Some(handle) = oracle_handle {
        handle.abort();
    }
    Ok(())
}

/// Load the configuration file named by `DEEPTIME_CONFIG`, or
/// `deeptime-config.yaml` in the working directory. A missing file means
/// defaults.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let path = std::env::var("DEEPTIME_CONFIG")
        .map_or_else(|_| PathBuf::from("deeptime-config.yaml"), PathBuf::from);
    Ok(SimulationConfig::load_or_default(&path)?)
}

/// Spawn the embedded oracle if configured. Returns its task handle and
/// the URL the client should use.
async fn start_oracle(
    config: &SimulationConfig,
) -> Result<(Option<tokio::task::JoinHandle<()>>, String), EngineError> {
    if !config.oracle.embedded {
        return Ok((None, config.oracle.url.clone()));
    }

    let limiter = RateLimiter::new(
        config.oracle.rate_limit_max_requests,
        Duration::from_secs(config.oracle.rate_limit_window_secs),
    );
    let server = ServerConfig {
        host: String::from("127.0.0.1"),
        port: config.oracle.port,
    };
    let (handle, addr) = spawn_oracle(&server, Arc::new(AppState::new(limiter))).await?;
    info!(%addr, "Embedded oracle started");
    Ok((Some(handle), format!("http://{addr}")))
}
