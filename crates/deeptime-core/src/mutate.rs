//! Merging oracle deltas into the world state.
//!
//! [`apply_simulator_update`] is the single point where externally produced
//! deltas touch durable state. Delta keys are resolved through explicit
//! name-to-field tables. Keys the tables do not know, and values that are
//! not numbers, are skipped so that producers can add fields without
//! breaking older engines.

use std::collections::BTreeMap;

use deeptime_types::{GameState, GlobalState, HiddenState, ParsedSimulatorUpdate, QueueEvent};
use tracing::debug;
use uuid::Uuid;

use crate::events::enqueue_events;
use crate::simulation::clamp_global_state;

/// Resolve a delta key to a visible planetary scalar.
///
/// Only top-level numeric fields are addressable; `atmos` is a record, not
/// a number.
pub fn global_field_mut<'a>(global: &'a mut GlobalState, key: &str) -> Option<&'a mut f64> {
    match key {
        "mean_temp_c" => Some(&mut global.mean_temp_c),
        "atmos_pressure_atm" => Some(&mut global.atmos_pressure_atm),
        "ocean_ph" => Some(&mut global.ocean_ph),
        "water_fraction" => Some(&mut global.water_fraction),
        "ice_fraction" => Some(&mut global.ice_fraction),
        "land_fraction" => Some(&mut global.land_fraction),
        "biodiversity_index" => Some(&mut global.biodiversity_index),
        "extinction_risk" => Some(&mut global.extinction_risk),
        "habitability" => Some(&mut global.habitability),
        "complexity_potential" => Some(&mut global.complexity_potential),
        _ => None,
    }
}

/// Resolve a delta key to a hidden scalar.
pub fn hidden_field_mut<'a>(hidden: &'a mut HiddenState, key: &str) -> Option<&'a mut f64> {
    match key {
        "mantle_heat" => Some(&mut hidden.mantle_heat),
        "plate_mobility" => Some(&mut hidden.plate_mobility),
        "magnetic_field_strength" => Some(&mut hidden.magnetic_field_strength),
        "nutrient_flux" => Some(&mut hidden.nutrient_flux),
        "ocean_circulation_strength" => Some(&mut hidden.ocean_circulation_strength),
        "impact_flux" => Some(&mut hidden.impact_flux),
        "stellar_brightening_factor" => Some(&mut hidden.stellar_brightening_factor),
        "evolutionary_option_space" => Some(&mut hidden.evolutionary_option_space),
        _ => None,
    }
}

/// Add every resolvable numeric delta to its field. Returns how many
/// entries were skipped.
fn apply_deltas<T>(
    target: &mut T,
    deltas: &BTreeMap<String, serde_json::Value>,
    resolve: impl for<'a> Fn(&'a mut T, &str) -> Option<&'a mut f64>,
) -> usize {
    let mut skipped: usize = 0;
    for (key, value) in deltas {
        match (resolve(target, key), value.as_f64()) {
            (Some(field), Some(delta)) => *field += delta,
            _ => skipped = skipped.saturating_add(1),
        }
    }
    skipped
}

/// Merge a delta into the world state.
///
/// 1. Charges `ob_cost_final`, or `fallback_cost` when absent. OB never
///    goes below zero; affordability is the caller's check.
/// 2. Adds `entropy_debt_delta`, flooring debt at zero.
/// 3. Adds numeric global and hidden deltas in place.
/// 4. Schedules `queue_add` entries relative to the current time.
/// 5. Clamps every global field into its domain.
pub fn apply_simulator_update(
    state: &mut GameState,
    update: &ParsedSimulatorUpdate,
    fallback_cost: f64,
) {
    let ob_cost = update.ob_cost_final.unwrap_or(fallback_cost);
    let entropy_delta = update.entropy_debt_delta.unwrap_or(0.0);

    state.resources.ob_current = (state.resources.ob_current - ob_cost).max(0.0);
    state.resources.entropy_debt = (state.resources.entropy_debt + entropy_delta).max(0.0);

    let skipped_global = apply_deltas(&mut state.global, &update.global_deltas, global_field_mut);
    let skipped_hidden = apply_deltas(&mut state.hidden, &update.hidden_deltas, hidden_field_mut);
    if skipped_global > 0 || skipped_hidden > 0 {
        debug!(
            skipped_global,
            skipped_hidden, "ignored unknown or non-numeric delta entries"
        );
    }

    if !update.queue_add.is_empty() {
        let now = state.time_years;
        let call_id = Uuid::new_v4().simple();
        let queued: Vec<QueueEvent> = update
            .queue_add
            .iter()
            .enumerate()
            .map(|(index, spec)| QueueEvent {
                id: format!("ev_{now}_{call_id}_{index}"),
                trigger_time_years: now + spec.trigger_in_years,
                event_type: spec.event_type.clone(),
                severity: spec.severity,
                summary: spec.summary.clone(),
                payload: BTreeMap::new(),
            })
            .collect();
        enqueue_events(state, queued);
    }

    clamp_global_state(state);
}
