//! Offworld colony launches.

use deeptime_types::{Colony, GameState};
use thiserror::Error;
use tracing::info;

/// OB charged for a colony launch when the caller does not override it.
pub const DEFAULT_COLONY_COST: f64 = 30.0;

/// Stability of a freshly founded colony.
pub const INITIAL_COLONY_STABILITY: f64 = 72.0;

/// Launch sites, assigned round-robin in launch order.
pub const COLONY_NODES: [&str; 3] = ["Moon", "Mars", "Asteroids"];

/// Reasons a colony launch is refused.
#[derive(Debug, Error, PartialEq)]
pub enum OffworldError {
    /// The spacefaring era has not been reached.
    #[error("offworld expansion is not unlocked yet")]
    NotEnabled,

    /// Not enough OB for the launch.
    #[error("not enough OB to seed an offworld colony: need {cost}, have {available}")]
    InsufficientBudget {
        /// OB the launch costs.
        cost: f64,
        /// OB currently available.
        available: f64,
    },
}

/// Found a new offworld colony, charging `cost` OB.
///
/// The colony starts at age zero, needs no imports, and is not yet
/// self-sustaining; [`crate::events::update_colony_ages`] promotes it once
/// it is old enough.
pub fn launch_colony(state: &mut GameState, cost: f64) -> Result<Colony, OffworldError> {
    if !state.offworld.enabled {
        return Err(OffworldError::NotEnabled);
    }
    let available = state.resources.ob_current;
    if available < cost {
        return Err(OffworldError::InsufficientBudget { cost, available });
    }

    state.resources.ob_current = available - cost;

    let colonies = &mut state.offworld.colonies;
    let index = colonies.len();
    let node = COLONY_NODES
        .get(index % COLONY_NODES.len())
        .copied()
        .unwrap_or("Moon");
    let species_id = format!("sp_{}", index.saturating_add(1));
    info!(species_id = %species_id, node, cost, "offworld colony launched");

    let colony = Colony {
        species_id,
        node: node.to_owned(),
        stability: INITIAL_COLONY_STABILITY,
        self_sustaining: false,
        imports_needed: false,
        age_years: 0.0,
    };
    colonies.push(colony.clone());
    Ok(colony)
}
