//! Player interventions: classification, pricing, and resolution.
//!
//! An intervention is free text. It is classified by keyword into a
//! scope and magnitude, priced against the current entropy debt, checked
//! for affordability, narrated by the oracle, and finally resolved into a
//! state delta. When the oracle's reply carries no usable delta the player
//! still pays: the local fallback charges the planned cost and adds the
//! planned entropy gain.

use deeptime_types::{
    ActionAssumptions, ActionTarget, EconomyEstimate, GameState, Magnitude, ParsedSimulatorUpdate,
    PlayerAction, Scope, SimulationResponse,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::economy::{InterventionCostInput, compute_entropy_gain, compute_intervention_cost};
use crate::mutate::apply_simulator_update;
use crate::parse::parse_simulator_update;

/// Errors raised before an intervention is sent to the oracle.
#[derive(Debug, Error, PartialEq)]
pub enum InterventionError {
    /// The action text was blank.
    #[error("intervention text is empty")]
    EmptyAction,

    /// The player cannot pay for the planned intervention.
    #[error("insufficient OB: need {cost}, have {available}")]
    InsufficientBudget {
        /// Planned cost.
        cost: f64,
        /// OB currently available.
        available: f64,
    },
}

/// Scope and magnitude read from the action text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Spatial reach.
    pub scope: Scope,
    /// Strength.
    pub magnitude: Magnitude,
}

/// Classify action text by keyword, case-insensitively.
///
/// Scope: `planet` or `global` is planetary, `region` is regional,
/// anything else is local. Magnitude: `huge` or `asteroid` is huge, `tiny`
/// or `small` is small, anything else is medium. Keyword text never
/// produces [`Magnitude::Tiny`].
pub fn classify(text: &str) -> Classification {
    let lowered = text.to_lowercase();
    let has = |needle: &str| lowered.contains(needle);

    let scope = if has("planet") || has("global") {
        Scope::Planetary
    } else if has("region") {
        Scope::Regional
    } else {
        Scope::Local
    };
    let magnitude = if has("huge") || has("asteroid") {
        Magnitude::Huge
    } else if has("tiny") || has("small") {
        Magnitude::Small
    } else {
        Magnitude::Medium
    };

    Classification { scope, magnitude }
}

/// A priced intervention, ready to be checked and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct InterventionPlan {
    /// The player's action text, trimmed.
    pub text: String,
    /// Keyword classification of the text.
    pub classification: Classification,
    /// OB cost estimate sent to the oracle and charged on fallback.
    pub cost: f64,
    /// Entropy debt added on fallback.
    pub entropy_gain: f64,
    /// Entropy debt when the plan was made.
    pub entropy_debt_before: f64,
}

impl InterventionPlan {
    /// The action body for the oracle, targeting `cells` as a region.
    pub fn player_action(&self, cells: Vec<u32>) -> PlayerAction {
        PlayerAction {
            text: self.text.clone(),
            target: Some(ActionTarget {
                target_type: "region".to_owned(),
                cells,
            }),
            assumptions: Some(ActionAssumptions {
                scope_hint: self.classification.scope,
                magnitude_hint: self.classification.magnitude,
            }),
        }
    }

    /// The economy estimate for the oracle.
    pub const fn economy(&self) -> EconomyEstimate {
        EconomyEstimate {
            ob_cost_estimate: Some(self.cost),
            entropy_debt_before: Some(self.entropy_debt_before),
        }
    }
}

/// Classify and price an intervention against the current state.
///
/// Affordability is checked separately by [`ensure_affordable`].
///
/// # Errors
///
/// Returns [`InterventionError::EmptyAction`] for blank text.
pub fn plan_intervention(
    text: &str,
    state: &GameState,
    repeated_count: Option<i64>,
) -> Result<InterventionPlan, InterventionError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InterventionError::EmptyAction);
    }

    let classification = classify(text);
    let entropy_debt = state.resources.entropy_debt;
    let input = InterventionCostInput {
        repeated_count,
        ..InterventionCostInput::new(classification.scope, classification.magnitude, entropy_debt)
    };
    let cost = compute_intervention_cost(&input);
    let entropy_gain = compute_entropy_gain(cost, classification.magnitude);

    Ok(InterventionPlan {
        text: text.to_owned(),
        classification,
        cost,
        entropy_gain,
        entropy_debt_before: entropy_debt,
    })
}

/// Refuse a plan the player cannot pay for.
pub fn ensure_affordable(state: &GameState, plan: &InterventionPlan) -> Result<(), InterventionError> {
    let available = state.resources.ob_current;
    if available < plan.cost {
        return Err(InterventionError::InsufficientBudget {
            cost: plan.cost,
            available,
        });
    }
    Ok(())
}

/// How an oracle reply was turned into a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The oracle's delta was applied.
    OracleDelta,
    /// No usable delta; the planned cost and entropy gain were applied.
    Fallback,
}

/// Apply an oracle reply to the state.
///
/// A reply with `parse_ok` contributes its structured delta, re-parsed
/// from `raw_text` if the structured field is missing. Anything else
/// falls back to charging the plan's cost and entropy gain.
pub fn resolve_intervention(
    state: &mut GameState,
    plan: &InterventionPlan,
    response: &SimulationResponse,
) -> Resolution {
    let update = if response.parse_ok {
        response
            .parsed_update
            .clone()
            .or_else(|| parse_simulator_update(&response.raw_text).into_update())
    } else {
        None
    };

    if let Some(update) = update {
        apply_simulator_update(state, &update, plan.cost);
        info!(
            text = %plan.text,
            cost = update.ob_cost_final.unwrap_or(plan.cost),
            model = %response.model_meta.model,
            "intervention resolved with oracle delta"
        );
        Resolution::OracleDelta
    } else {
        warn!(
            text = %plan.text,
            cost = plan.cost,
            entropy_gain = plan.entropy_gain,
            "oracle returned no usable delta, applying fallback"
        );
        apply_simulator_update(
            state,
            &ParsedSimulatorUpdate::entropy_only(plan.entropy_gain),
            plan.cost,
        );
        Resolution::Fallback
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use deeptime_types::ModelMeta;

    use super::*;

    fn response(raw_text: &str, parsed_update: Option<ParsedSimulatorUpdate>, parse_ok: bool) -> SimulationResponse {
        SimulationResponse {
            raw_text: raw_text.to_owned(),
            parsed_update,
            parse_ok,
            model_meta: ModelMeta {
                model: "test".to_owned(),
                latency_ms: 1,
            },
            moderation: None,
        }
    }

    #[test]
    fn classify_reads_scope_and_magnitude_keywords() {
        let c = classify("Drop a HUGE asteroid on the planet");
        assert_eq!(c.scope, Scope::Planetary);
        assert_eq!(c.magnitude, Magnitude::Huge);

        let c = classify("warm the polar region a small amount");
        assert_eq!(c.scope, Scope::Regional);
        assert_eq!(c.magnitude, Magnitude::Small);

        let c = classify("seed a tiny reef");
        assert_eq!(c.scope, Scope::Local);
        assert_eq!(c.magnitude, Magnitude::Small);

        let c = classify("raise the global ocean");
        assert_eq!(c.scope, Scope::Planetary);
        assert_eq!(c.magnitude, Magnitude::Medium);
    }

    #[test]
    fn plan_prices_against_entropy_debt() {
        let mut state = GameState::default();
        let plan = plan_intervention("  cool the region  ", &state, None).unwrap();
        assert_eq!(plan.text, "cool the region");
        assert_eq!(plan.cost, 22.0);
        assert!((plan.entropy_gain - 17.6).abs() < 1e-9);

        state.resources.entropy_debt = 150.0;
        let plan = plan_intervention("cool the region", &state, Some(1)).unwrap();
        // 22 * 2 * 1.2
        assert_eq!(plan.cost, 53.0);
        assert_eq!(plan.economy().entropy_debt_before, Some(150.0));
    }

    #[test]
    fn blank_text_is_rejected() {
        let err = plan_intervention("   ", &GameState::default(), None).unwrap_err();
        assert_eq!(err, InterventionError::EmptyAction);
    }

    #[test]
    fn unaffordable_plan_is_refused_without_mutation() {
        let mut state = GameState::default();
        state.resources.ob_current = 10.0;
        let plan = plan_intervention("huge planet reshaping", &state, None).unwrap();
        let err = ensure_affordable(&state, &plan).unwrap_err();
        assert_eq!(
            err,
            InterventionError::InsufficientBudget {
                cost: 90.0,
                available: 10.0
            }
        );
        assert_eq!(state.resources.ob_current, 10.0);
    }

    #[test]
    fn player_action_carries_hints() {
        let plan = plan_intervention("region", &GameState::default(), None).unwrap();
        let action = plan.player_action(vec![7]);
        let assumptions = action.assumptions.unwrap();
        assert_eq!(assumptions.scope_hint, Scope::Regional);
        assert_eq!(assumptions.magnitude_hint, Magnitude::Medium);
        assert_eq!(action.target.unwrap().cells, vec![7]);
    }

    #[test]
    fn structured_delta_is_applied() {
        let mut state = GameState::default();
        let plan = plan_intervention("warm things", &state, None).unwrap();
        let update = ParsedSimulatorUpdate {
            ob_cost_final: Some(12.0),
            entropy_debt_delta: Some(3.0),
            ..ParsedSimulatorUpdate::default()
        };
        let resolution = resolve_intervention(&mut state, &plan, &response("ok", Some(update), true));
        assert_eq!(resolution, Resolution::OracleDelta);
        assert_eq!(state.resources.ob_current, 88.0);
        assert_eq!(state.resources.entropy_debt, 3.0);
    }

    #[test]
    fn missing_structured_field_is_reparsed_from_text() {
        let mut state = GameState::default();
        let plan = plan_intervention("warm things", &state, None).unwrap();
        let raw = "Story\n---UPDATE_JSON---\n{\"ob_cost_final\":4}\n---END_UPDATE_JSON---";
        let resolution = resolve_intervention(&mut state, &plan, &response(raw, None, true));
        assert_eq!(resolution, Resolution::OracleDelta);
        assert_eq!(state.resources.ob_current, 96.0);
    }

    #[test]
    fn array_block_in_text_falls_back_to_plan() {
        let mut state = GameState::default();
        let plan = plan_intervention("reshape the region", &state, None).unwrap();
        assert_eq!(plan.cost, 22.0);
        let raw = "Story ---UPDATE_JSON--- [1, 2] ---END_UPDATE_JSON---";
        let resolution = resolve_intervention(&mut state, &plan, &response(raw, None, true));
        assert_eq!(resolution, Resolution::Fallback);
        assert_eq!(state.resources.ob_current, 78.0);
        assert_eq!(state.resources.entropy_debt, plan.entropy_gain);
    }

    #[test]
    fn unparsed_reply_falls_back_to_plan() {
        let mut state = GameState::default();
        let plan = plan_intervention("warm things", &state, None).unwrap();
        let resolution = resolve_intervention(&mut state, &plan, &response("Reality wobbles.", None, false));
        assert_eq!(resolution, Resolution::Fallback);
        assert_eq!(state.resources.ob_current, 100.0 - plan.cost);
        assert_eq!(state.resources.entropy_debt, plan.entropy_gain);
    }
}
