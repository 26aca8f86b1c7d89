//! The persisted world state for the Deep Time simulation.
//!
//! [`GameState`] is the single root aggregate. It is owned by the caller
//! (the engine binary or the browser client); simulation functions borrow
//! it for the duration of one call and never retain it.
//!
//! Field names are the persisted JSON keys. Do not rename fields without a
//! matching change to the client bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DifficultyMode;

/// Schema version written into freshly created states.
pub const STATE_VERSION: &str = "1.0";

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 123_456_789;

/// Age of the planet, in years, when the simulation starts.
pub const INITIAL_EARTH_AGE_YEARS: f64 = 1_000_000_000.0;

/// Era flag names in the order milestones unlock them.
pub const ERA_NAMES: [&str; 9] = [
    "prebiotic",
    "microbial",
    "oxygenation",
    "eukaryotes",
    "multicell",
    "intelligence",
    "industry",
    "spacefaring",
    "offworld_colony",
];

/// Root aggregate of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Schema version. Carried but not validated.
    pub version: String,
    /// Seed for reproducible random rolls.
    #[ts(type = "number")]
    pub seed: u64,
    /// Simulated years elapsed since the start of the run.
    pub time_years: f64,
    /// Age of the planet at `time_years == 0`.
    pub earth_age_years: f64,
    /// Difficulty settings.
    pub difficulty: Difficulty,
    /// The player's spendable budget and accumulated debt.
    pub resources: Resources,
    /// Player-visible planetary scalars.
    pub global: GlobalState,
    /// Auxiliary scalars not shown to the player.
    pub hidden: HiddenState,
    /// Milestone flags keyed by era name. Once true, never reset.
    pub eras: BTreeMap<String, bool>,
    /// Offworld expansion state.
    pub offworld: Offworld,
    /// Scheduled events, ascending by trigger time.
    pub queue: Vec<QueueEvent>,
}

impl GameState {
    /// Create the opening state of a new run.
    ///
    /// A young, warm, CO2-heavy planet with microbial prerequisites not yet
    /// met. Only the `prebiotic` era is unlocked.
    pub fn new(seed: u64) -> Self {
        let eras = ERA_NAMES
            .iter()
            .map(|name| ((*name).to_owned(), *name == "prebiotic"))
            .collect();

        Self {
            version: STATE_VERSION.to_owned(),
            seed,
            time_years: 0.0,
            earth_age_years: INITIAL_EARTH_AGE_YEARS,
            difficulty: Difficulty::default(),
            resources: Resources {
                ob_current: 100.0,
                ob_max: 100.0,
                entropy_debt: 0.0,
            },
            global: GlobalState {
                mean_temp_c: 18.0,
                atmos_pressure_atm: 1.0,
                atmos: Atmosphere {
                    co2_ppm: 2000.0,
                    ch4_ppm: 1500.0,
                    o2_percent: 1.0,
                    n2_percent: 78.0,
                    other_percent: 20.0,
                },
                ocean_ph: 7.8,
                water_fraction: 0.71,
                ice_fraction: 0.05,
                land_fraction: 0.29,
                biodiversity_index: 5.0,
                extinction_risk: 25.0,
                habitability: 35.0,
                complexity_potential: 10.0,
            },
            hidden: HiddenState {
                mantle_heat: 75.0,
                plate_mobility: 40.0,
                magnetic_field_strength: 60.0,
                nutrient_flux: 45.0,
                ocean_circulation_strength: 55.0,
                impact_flux: 50.0,
                stellar_brightening_factor: 1.02,
                evolutionary_option_space: 30.0,
            },
            eras,
            offworld: Offworld::default(),
            queue: Vec::new(),
        }
    }

    /// Whether the named era has been reached.
    pub fn era_reached(&self, name: &str) -> bool {
        self.eras.get(name).copied().unwrap_or(false)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Difficulty settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Difficulty {
    /// Prestige level; each level speeds OB regeneration by 5%.
    pub ascension_level: u32,
    /// Difficulty mode.
    pub mode: DifficultyMode,
}

/// The player's budget and instability counters.
///
/// Invariants: `0 <= ob_current <= ob_max` and `entropy_debt >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Spendable budget.
    pub ob_current: f64,
    /// Budget ceiling.
    pub ob_max: f64,
    /// Accumulated instability. Unbounded above; displayed on a 0-100 bar.
    pub entropy_debt: f64,
}

/// Atmospheric composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Atmosphere {
    /// Carbon dioxide, parts per million. Unclamped.
    pub co2_ppm: f64,
    /// Methane, parts per million. Unclamped.
    pub ch4_ppm: f64,
    /// Oxygen share of the atmosphere, clamped to `[0, 35]`.
    pub o2_percent: f64,
    /// Nitrogen share. Unclamped.
    pub n2_percent: f64,
    /// Everything else. Unclamped.
    pub other_percent: f64,
}

/// Player-visible planetary scalars.
///
/// Each field is clamped to its own domain by `clamp_global_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GlobalState {
    /// Mean surface temperature in Celsius, `[-100, 100]`.
    pub mean_temp_c: f64,
    /// Surface pressure in atmospheres. Unclamped.
    pub atmos_pressure_atm: f64,
    /// Atmospheric composition.
    pub atmos: Atmosphere,
    /// Ocean acidity, `[0, 14]`.
    pub ocean_ph: f64,
    /// Share of the surface covered by liquid water, `[0, 1]`.
    pub water_fraction: f64,
    /// Share of the surface covered by ice, `[0, 1]`.
    pub ice_fraction: f64,
    /// Share of the surface that is dry land, `[0, 1]`.
    pub land_fraction: f64,
    /// Biodiversity index, `[0, 100]`.
    pub biodiversity_index: f64,
    /// Extinction risk, `[0, 100]`.
    pub extinction_risk: f64,
    /// Habitability, `[0, 100]`.
    pub habitability: f64,
    /// Potential for complex life and civilization, `[0, 100]`.
    pub complexity_potential: f64,
}

/// Auxiliary scalars hidden from the player. Free-running and unclamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HiddenState {
    /// Residual heat in the mantle.
    pub mantle_heat: f64,
    /// Tectonic plate mobility.
    pub plate_mobility: f64,
    /// Strength of the planetary magnetic field.
    pub magnetic_field_strength: f64,
    /// Nutrient supply to the oceans; 50 is neutral for ocean pH.
    pub nutrient_flux: f64,
    /// Strength of the thermohaline circulation.
    pub ocean_circulation_strength: f64,
    /// Rate of incoming impactors.
    pub impact_flux: f64,
    /// Host star luminosity relative to the start of the run.
    pub stellar_brightening_factor: f64,
    /// Breadth of open evolutionary niches.
    pub evolutionary_option_space: f64,
}

/// Offworld expansion state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Offworld {
    /// Whether colony launches are unlocked.
    pub enabled: bool,
    /// Colonies in launch order.
    pub colonies: Vec<Colony>,
}

/// An offworld colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Colony {
    /// Identifier of the founding species.
    pub species_id: String,
    /// Where the colony lives (Moon, Mars, ...).
    pub node: String,
    /// Stability score; above 70 counts toward self-sufficiency.
    pub stability: f64,
    /// Derived each tick from stability, imports, and age.
    pub self_sustaining: bool,
    /// Whether the colony still depends on shipments from home.
    pub imports_needed: bool,
    /// Years since founding.
    pub age_years: f64,
}

/// A scheduled world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueueEvent {
    /// Unique event identifier.
    pub id: String,
    /// Absolute simulated time at which the event fires.
    pub trigger_time_years: f64,
    /// Event category (e.g. `natural`, `player_consequence`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Severity, conventionally 0-100.
    pub severity: f64,
    /// One-line description for the timeline.
    pub summary: String,
    /// Free-form extra data.
    #[serde(default)]
    pub payload: BTreeMap<String, serde_json::Value>,
}
