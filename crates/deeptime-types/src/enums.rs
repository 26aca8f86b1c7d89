//! Enumeration types for the Deep Time simulation.
//!
//! Intervention classification axes and the difficulty mode. All variants
//! serialize in lowercase to match the browser client's wire format.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Spatial reach of a player intervention.
///
/// Ordered from narrowest to widest; cost rises along this axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Scope {
    /// A single cell or small area.
    Local,
    /// A continent, basin, or climate band.
    Regional,
    /// The whole planet.
    Planetary,
}

impl Scope {
    /// All scopes in ascending order of reach.
    pub const ALL: [Self; 3] = [Self::Local, Self::Regional, Self::Planetary];
}

/// Strength of a player intervention.
///
/// Ordered from weakest to strongest; cost and entropy gain rise along
/// this axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Magnitude {
    /// Barely perceptible nudge.
    Tiny,
    /// Noticeable but contained change.
    Small,
    /// Significant change.
    Medium,
    /// World-altering change.
    Huge,
}

impl Magnitude {
    /// All magnitudes in ascending order of strength.
    pub const ALL: [Self; 4] = [Self::Tiny, Self::Small, Self::Medium, Self::Huge];
}

/// Difficulty mode carried in the saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DifficultyMode {
    /// Difficulty scales with the ascension level.
    #[default]
    Dynamic,
    /// Difficulty is fixed for the whole run.
    Fixed,
}
