//! Simulation core for Deep Time.
//!
//! Everything here is synchronous and operates on a caller-owned
//! [`GameState`](deeptime_types::GameState) borrowed for one call at a time.
//!
//! # Modules
//!
//! - [`simulation`] -- Baseline physics step, time conversion, domain clamp
//! - [`economy`] -- Intervention pricing and resource drift
//! - [`events`] -- Event queue, colony ageing, win condition
//! - [`parse`] -- Oracle narrative update-block extraction
//! - [`mutate`] -- Merging oracle deltas into the state
//! - [`milestones`] -- Era flag checks
//! - [`intervention`] -- Keyword classification, planning, resolution
//! - [`offworld`] -- Colony launches
//! - [`tick`] -- The full per-tick pipeline
//! - [`persistence`] -- JSON save slots
//! - [`config`] -- YAML configuration

pub mod config;
pub mod economy;
pub mod events;
pub mod intervention;
pub mod milestones;
pub mod mutate;
pub mod offworld;
pub mod parse;
pub mod persistence;
pub mod simulation;
pub mod tick;

pub use config::{ConfigError, SimulationConfig};
pub use economy::{
    InterventionCostInput, ResourceDrift, apply_resource_drift, compute_entropy_gain,
    compute_intervention_cost,
};
pub use events::{drain_triggered_events, enqueue_events, has_win_condition, update_colony_ages};
pub use intervention::{InterventionError, InterventionPlan, Resolution, classify};
pub use mutate::apply_simulator_update;
pub use parse::{ParseOutcome, parse_simulator_update};
pub use persistence::{PersistenceError, load_slot, save_slot};
pub use simulation::{clamp_global_state, compute_dt_years, step_baseline};
pub use tick::{TickSummary, run_tick};
