//! Narration backends.
//!
//! A [`Narrator`] turns an intervention or a world event into prose plus a
//! structured [`ParsedSimulatorUpdate`]. The prose always embeds the update
//! as a delimited block, so clients that only keep `raw_text` can recover
//! the delta with the core parser.
//!
//! [`MockNarrator`] is a deterministic keyword model used for offline play
//! and tests.

use std::collections::BTreeMap;

use deeptime_core::parse::render_update_block;
use deeptime_types::{ParsedSimulatorUpdate, QueuedEventSpec};
use serde_json::json;

use crate::error::OracleError;

/// Cost estimate assumed when the client sends none.
pub const DEFAULT_COST_ESTIMATE: f64 = 22.0;

/// Summary used when an event request has none.
pub const DEFAULT_EVENT_SUMMARY: &str = "A major world event unfolds.";

/// Years until the consequence scheduled by every intervention arrives.
pub const CONSEQUENCE_DELAY_YEARS: f64 = 800_000.0;

/// A narrated outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    /// Prose with the update block appended.
    pub raw_text: String,
    /// The structured delta embedded in `raw_text`.
    pub update: ParsedSimulatorUpdate,
    /// Name of the model that produced it.
    pub model: String,
}

/// A narration backend.
pub trait Narrator: Send + Sync {
    /// Name reported in `model_meta` for interventions.
    fn model(&self) -> &str;

    /// Narrate a player intervention priced at `cost_estimate` with the
    /// world carrying `entropy_debt_before`.
    fn narrate_intervention(
        &self,
        text: &str,
        cost_estimate: f64,
        entropy_debt_before: f64,
    ) -> Result<Narration, OracleError>;

    /// Narrate a world event.
    fn narrate_event(&self, summary: &str) -> Result<Narration, OracleError>;
}

/// Deterministic keyword narrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockNarrator;

impl MockNarrator {
    /// Model name for interventions.
    pub const MODEL: &'static str = "mock-sim";

    /// Model name for world events.
    pub const EVENT_MODEL: &'static str = "mock-event";
}

/// Final OB cost: the estimate inflated by up to 20% as debt reaches 100,
/// never below 1.
pub fn final_cost(cost_estimate: f64, entropy_debt_before: f64) -> f64 {
    (cost_estimate * (1.0 + (entropy_debt_before / 500.0).min(0.2)))
        .round()
        .max(1.0)
}

/// The keyword delta for an intervention.
pub fn intervention_update(text: &str, cost_estimate: f64, entropy_debt_before: f64) -> ParsedSimulatorUpdate {
    let lowered = text.to_lowercase();
    let has = |needle: &str| lowered.contains(needle);

    let temp = if has("ice") {
        -1.1
    } else if has("co2") || has("volcano") {
        1.1
    } else {
        0.2
    };
    let bio: f64 = if has("asteroid") {
        -8.0
    } else if has("ocean") {
        4.0
    } else {
        1.0
    };
    let risk = if has("asteroid") { 15.0 } else { 3.0 };
    let thriving = bio > 0.0;

    let ob_cost_final = final_cost(cost_estimate, entropy_debt_before);
    let entropy_factor = if has("asteroid") { 1.1 } else { 0.6 };

    let global_deltas = BTreeMap::from([
        ("mean_temp_c".to_owned(), json!(temp)),
        ("biodiversity_index".to_owned(), json!(bio)),
        ("extinction_risk".to_owned(), json!(risk)),
        ("habitability".to_owned(), json!(if thriving { 2.0 } else { -5.0 })),
        ("complexity_potential".to_owned(), json!(if thriving { 1.0 } else { -2.0 })),
    ]);
    let hidden_deltas = BTreeMap::from([
        ("nutrient_flux".to_owned(), json!(if has("nutrient") { 10.0 } else { 1.0 })),
        ("plate_mobility".to_owned(), json!(if has("tectonic") { 4.0 } else { 0.0 })),
        (
            "evolutionary_option_space".to_owned(),
            json!(if thriving { 2.0 } else { -3.0 }),
        ),
    ]);

    ParsedSimulatorUpdate {
        ob_cost_final: Some(ob_cost_final),
        entropy_debt_delta: Some((ob_cost_final * entropy_factor).round().max(1.0)),
        global_deltas,
        hidden_deltas,
        queue_add: vec![QueuedEventSpec {
            trigger_in_years: CONSEQUENCE_DELAY_YEARS,
            event_type: "player_consequence".to_owned(),
            severity: 35.0,
            summary: "Second-order ecosystem shift arrives with side effects.".to_owned(),
        }],
        notes_for_player: vec!["Consequences compound with high Entropy Debt.".to_owned()],
    }
}

/// The fixed delta for a world event: free, a little debt, a hit to life.
pub fn event_update() -> ParsedSimulatorUpdate {
    ParsedSimulatorUpdate {
        ob_cost_final: Some(0.0),
        entropy_debt_delta: Some(3.0),
        global_deltas: BTreeMap::from([
            ("extinction_risk".to_owned(), json!(5.0)),
            ("biodiversity_index".to_owned(), json!(-4.0)),
        ]),
        ..ParsedSimulatorUpdate::default()
    }
}

impl Narrator for MockNarrator {
    fn model(&self) -> &str {
        Self::MODEL
    }

    fn narrate_intervention(
        &self,
        text: &str,
        cost_estimate: f64,
        entropy_debt_before: f64,
    ) -> Result<Narration, OracleError> {
        let update = intervention_update(text, cost_estimate, entropy_debt_before);
        let block = render_update_block(&update)?;
        Ok(Narration {
            raw_text: format!("You twist the world and reality grudgingly complies.\n\n{block}"),
            update,
            model: Self::MODEL.to_owned(),
        })
    }

    fn narrate_event(&self, summary: &str) -> Result<Narration, OracleError> {
        let update = event_update();
        let block = render_update_block(&update)?;
        Ok(Narration {
            raw_text: format!("{summary}\nThe biosphere adapts, badly.\n\n{block}"),
            update,
            model: Self::EVENT_MODEL.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use deeptime_core::parse::{narrative_text, parse_simulator_update};

    use super::*;

    #[test]
    fn final_cost_inflates_with_debt_up_to_twenty_percent() {
        assert_eq!(final_cost(22.0, 0.0), 22.0);
        assert_eq!(final_cost(22.0, 50.0), 24.0);
        assert_eq!(final_cost(22.0, 1_000.0), 26.0);
        assert_eq!(final_cost(0.0, 0.0), 1.0);
    }

    #[test]
    fn asteroid_strikes_hurt_life() {
        let update = intervention_update("Drop a huge ASTEROID", 90.0, 0.0);
        assert_eq!(update.ob_cost_final, Some(90.0));
        assert_eq!(update.entropy_debt_delta, Some(99.0));
        assert_eq!(update.global_deltas["biodiversity_index"], json!(-8.0));
        assert_eq!(update.global_deltas["extinction_risk"], json!(15.0));
        assert_eq!(update.global_deltas["habitability"], json!(-5.0));
        assert_eq!(update.hidden_deltas["evolutionary_option_space"], json!(-3.0));
    }

    #[test]
    fn ocean_and_nutrient_keywords_help() {
        let update = intervention_update("boost ocean nutrient upwelling with ice", 10.0, 0.0);
        assert_eq!(update.global_deltas["mean_temp_c"], json!(-1.1));
        assert_eq!(update.global_deltas["biodiversity_index"], json!(4.0));
        assert_eq!(update.hidden_deltas["nutrient_flux"], json!(10.0));
        assert_eq!(update.hidden_deltas["plate_mobility"], json!(0.0));
        assert_eq!(update.entropy_debt_delta, Some(6.0));
        assert_eq!(update.queue_add.len(), 1);
        assert_eq!(update.queue_add[0].trigger_in_years, CONSEQUENCE_DELAY_YEARS);
    }

    #[test]
    fn narration_embeds_a_parseable_block() {
        let narration = MockNarrator
            .narrate_intervention("raise volcano co2", 22.0, 0.0)
            .unwrap();
        assert_eq!(narration.model, "mock-sim");
        assert_eq!(
            narrative_text(&narration.raw_text),
            "You twist the world and reality grudgingly complies."
        );

        let outcome = parse_simulator_update(&narration.raw_text);
        assert_eq!(outcome.parsed_update(), Some(&narration.update));
    }

    #[test]
    fn event_narration_is_free_but_costly_to_life() {
        let narration = MockNarrator.narrate_event("Supervolcano").unwrap();
        assert_eq!(narration.model, "mock-event");
        assert!(narration.raw_text.starts_with("Supervolcano\nThe biosphere adapts, badly."));
        assert_eq!(narration.update.ob_cost_final, Some(0.0));
        assert!(narration.update.queue_add.is_empty());
    }
}
