//! Intervention pricing and passive resource drift.
//!
//! Everything here is a pure function of its arguments. The multipliers in
//! [`compute_intervention_cost`] are each capped on their own and compound
//! multiplicatively with no combined ceiling.

use deeptime_types::{Magnitude, Scope};

use crate::simulation::{YEARS_PER_MYR, clamp};

/// Base OB cost, indexed by `[scope][magnitude]`.
///
/// Strictly increasing along both axes.
const COST_TABLE: [[f64; 4]; 3] = [
    // tiny, small, medium, huge
    [2.0, 5.0, 10.0, 18.0],  // local
    [6.0, 12.0, 22.0, 40.0], // regional
    [15.0, 30.0, 55.0, 90.0], // planetary
];

/// OB regenerated per million years at ascension level 0.
const BASE_REGEN_PER_MYR: f64 = 2.0;

/// Entropy debt shed per million years.
const ENTROPY_DECAY_PER_MYR: f64 = 0.2;

/// Everything needed to price an intervention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterventionCostInput {
    /// Spatial reach.
    pub scope: Scope,
    /// Strength.
    pub magnitude: Magnitude,
    /// How long the effect is sustained, in millions of years.
    pub duration_myr: Option<f64>,
    /// Current entropy debt.
    pub entropy_debt: f64,
    /// How many times the same action was repeated recently.
    pub repeated_count: Option<i64>,
}

impl InterventionCostInput {
    /// A one-off, instantaneous intervention.
    pub const fn new(scope: Scope, magnitude: Magnitude, entropy_debt: f64) -> Self {
        Self {
            scope,
            magnitude,
            duration_myr: None,
            entropy_debt,
            repeated_count: None,
        }
    }
}

/// Result of [`apply_resource_drift`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceDrift {
    /// New OB balance, within `[0, ob_max]`.
    pub ob: f64,
    /// New entropy debt, at least 0.
    pub ed: f64,
}

/// Look up the base cost for a scope/magnitude pair.
pub const fn base_cost(scope: Scope, magnitude: Magnitude) -> f64 {
    let row = match scope {
        Scope::Local => COST_TABLE[0],
        Scope::Regional => COST_TABLE[1],
        Scope::Planetary => COST_TABLE[2],
    };
    match magnitude {
        Magnitude::Tiny => row[0],
        Magnitude::Small => row[1],
        Magnitude::Medium => row[2],
        Magnitude::Huge => row[3],
    }
}

/// Price an intervention in whole OB.
///
/// `round(base * duration * entropy * spam)` where the duration multiplier
/// is capped at 3x, the entropy multiplier at 2x, and the spam multiplier
/// grows by 0.2 per repeat without a cap.
#[allow(clippy::cast_precision_loss)]
pub fn compute_intervention_cost(input: &InterventionCostInput) -> f64 {
    let base = base_cost(input.scope, input.magnitude);
    let duration = (1.0 + input.duration_myr.unwrap_or(0.0) / 5.0).min(3.0);
    let entropy = (1.0 + input.entropy_debt / 150.0).min(2.0);
    let repeated = input.repeated_count.unwrap_or(0).max(0);
    let spam = 1.0 + repeated as f64 * 0.2;
    (base * duration * entropy * spam).round()
}

/// Entropy debt an intervention incurs when the oracle supplies no delta.
pub const fn compute_entropy_gain(base_cost: f64, magnitude: Magnitude) -> f64 {
    let factor = match magnitude {
        Magnitude::Tiny | Magnitude::Small => 0.4,
        Magnitude::Medium => 0.8,
        Magnitude::Huge => 1.2,
    };
    base_cost * factor
}

/// Passive OB regeneration and entropy decay over `dt_years`.
///
/// High entropy debt suppresses regeneration down to a 25% floor. Debt
/// decays at a flat rate regardless of balance.
pub fn apply_resource_drift(
    ob_current: f64,
    ob_max: f64,
    entropy_debt: f64,
    dt_years: f64,
    ascension_level: u32,
) -> ResourceDrift {
    let dt_myr = dt_years / YEARS_PER_MYR;
    let regen_per_myr = BASE_REGEN_PER_MYR * (1.0 + 0.05 * f64::from(ascension_level));
    let regen_penalty = clamp(1.0 - entropy_debt / 200.0, 0.25, 1.0);
    let regen = regen_per_myr * dt_myr * regen_penalty;
    let decay = ENTROPY_DECAY_PER_MYR * dt_myr;

    ResourceDrift {
        ob: clamp(ob_current + regen, 0.0, ob_max),
        ed: (entropy_debt - decay).max(0.0),
    }
}
