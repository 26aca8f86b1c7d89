//! Strategy suggestions.
//!
//! Three safe moves and two chaos moves. The first chaos move escalates
//! once entropy debt passes [`CHAOS_THRESHOLD`].

use deeptime_types::{AdvisorResponse, AdvisorSuggestion};

/// Entropy debt above which the advisor proposes its riskiest gamble.
pub const CHAOS_THRESHOLD: f64 = 60.0;

fn suggestion(text: &str, expected_risk: &str, ob_cost: &str, mode: &str) -> AdvisorSuggestion {
    AdvisorSuggestion {
        text: text.to_owned(),
        expected_risk: expected_risk.to_owned(),
        ob_cost: ob_cost.to_owned(),
        mode: mode.to_owned(),
    }
}

/// Suggest next moves for a world carrying `entropy_debt`.
pub fn advise(entropy_debt: f64) -> AdvisorResponse {
    let gamble = if entropy_debt > CHAOS_THRESHOLD {
        "Open a controlled mantle plume and gamble on biodiversity reset."
    } else {
        "Test a regional tectonic uplift."
    };

    AdvisorResponse {
        suggestions: vec![
            suggestion("Stabilize ocean circulation in a key basin.", "low", "moderate", "safe"),
            suggestion("Increase nutrient upwelling along selected coasts.", "low", "cheap", "safe"),
            suggestion("Nudge greenhouse gases downward gradually.", "medium", "moderate", "safe"),
            suggestion(gamble, "high", "expensive", "chaos"),
            suggestion("Trigger a dramatic methane-haze experiment.", "high", "moderate", "chaos"),
        ],
    }
}
