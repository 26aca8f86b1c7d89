//! Request and response bodies exchanged with the narration oracle.
//!
//! The oracle moderates free text, narrates interventions and events, and
//! offers advice. These types are shared by the oracle server and the
//! engine's HTTP client so both ends agree on field names.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::update::ParsedSimulatorUpdate;

/// Entropy debt read from a client-supplied state snapshot.
///
/// Snapshots are loose JSON so partial or older-schema states are still
/// accepted; only `resources.entropy_debt` is consulted.
pub fn snapshot_entropy_debt(state: Option<&serde_json::Value>) -> Option<f64> {
    state?.pointer("/resources/entropy_debt")?.as_f64()
}

/// Narrative returned for text rejected by moderation.
pub const DENIAL_NARRATIVE: &str = "The cosmic tribunal denies reality-bending in that direction.";

/// Body of `POST /api/moderate`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModerationRequest {
    /// Text to review.
    #[serde(default)]
    pub text: String,
}

/// Outcome of a moderation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModerationVerdict {
    /// Whether the text may be acted on.
    pub allowed: bool,
    /// `ok` or `policy_blocked`.
    pub reason: String,
}

impl ModerationVerdict {
    /// A passing verdict.
    pub fn ok() -> Self {
        Self {
            allowed: true,
            reason: "ok".to_owned(),
        }
    }

    /// A failing verdict.
    pub fn blocked() -> Self {
        Self {
            allowed: false,
            reason: "policy_blocked".to_owned(),
        }
    }
}

/// The player's free-text action.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerAction {
    /// What the player typed.
    #[serde(default)]
    pub text: String,
    /// Optional map target (cell ids chosen in the client).
    #[serde(default)]
    #[ts(optional)]
    pub target: Option<ActionTarget>,
    /// Optional scope/magnitude hints from the client's classifier.
    #[serde(default)]
    #[ts(optional)]
    pub assumptions: Option<ActionAssumptions>,
}

/// Map target of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionTarget {
    /// Target kind, e.g. `region`.
    #[serde(rename = "type")]
    pub target_type: String,
    /// Selected map cells.
    #[serde(default)]
    pub cells: Vec<u32>,
}

/// Classifier hints sent along with an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionAssumptions {
    /// Scope the client assumed.
    pub scope_hint: crate::enums::Scope,
    /// Magnitude the client assumed.
    pub magnitude_hint: crate::enums::Magnitude,
}

/// Locally computed economy figures sent with an intervention.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EconomyEstimate {
    /// Cost the client expects to pay.
    #[serde(default)]
    #[ts(optional)]
    pub ob_cost_estimate: Option<f64>,
    /// Entropy debt before the action.
    #[serde(default)]
    #[ts(optional)]
    pub entropy_debt_before: Option<f64>,
}

/// Body of `POST /api/simulate/intervention`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InterventionRequest {
    /// Snapshot of the world the action is aimed at, as sent by the client.
    #[serde(default)]
    #[ts(optional)]
    pub state: Option<serde_json::Value>,
    /// The action itself.
    #[serde(default)]
    pub player_action: PlayerAction,
    /// Local cost estimate.
    #[serde(default)]
    pub economy: EconomyEstimate,
}

/// A world event handed to the oracle for narration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventDescription {
    /// Timeline summary of the event.
    #[serde(default)]
    #[ts(optional)]
    pub summary: Option<String>,
}

/// Body of `POST /api/simulate/event`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventRequest {
    /// The event to narrate.
    #[serde(default)]
    pub event: EventDescription,
}

/// Identifies which narrator produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModelMeta {
    /// Narrator model name.
    pub model: String,
    /// Time spent producing the response.
    #[ts(type = "number")]
    pub latency_ms: u64,
}

/// Response of the simulate endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationResponse {
    /// Narrative text, possibly containing one update block.
    pub raw_text: String,
    /// The delta, already decoded by the oracle.
    #[serde(default)]
    pub parsed_update: Option<ParsedSimulatorUpdate>,
    /// Whether `parsed_update` is usable.
    pub parse_ok: bool,
    /// Narrator metadata.
    pub model_meta: ModelMeta,
    /// Present when moderation rejected the action.
    #[serde(default)]
    #[ts(optional)]
    pub moderation: Option<ModerationVerdict>,
}

/// Body of `POST /api/advisor`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AdvisorRequest {
    /// Current world, used to tailor suggestions.
    #[serde(default)]
    #[ts(optional)]
    pub state: Option<serde_json::Value>,
}

impl AdvisorRequest {
    /// Entropy debt of the supplied state, if it carries one.
    pub fn entropy_debt(&self) -> Option<f64> {
        snapshot_entropy_debt(self.state.as_ref())
    }
}

/// One advisor suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AdvisorSuggestion {
    /// Suggested action text.
    pub text: String,
    /// `low`, `medium`, or `high`.
    pub expected_risk: String,
    /// `cheap`, `moderate`, or `expensive`.
    pub ob_cost: String,
    /// `safe` or `chaos`.
    pub mode: String,
}

/// Response of `POST /api/advisor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AdvisorResponse {
    /// Suggestions, safe ones first.
    pub suggestions: Vec<AdvisorSuggestion>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::GameState;

    #[test]
    fn partial_state_snapshot_is_accepted() {
        let json = r#"{"state":{"resources":{"entropy_debt":75}}}"#;
        let request: AdvisorRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.entropy_debt(), Some(75.0));

        let json = r#"{"state":{"version":"0.1","global":{}},"player_action":{"text":"x"}}"#;
        let request: InterventionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot_entropy_debt(request.state.as_ref()), None);
        assert_eq!(request.player_action.text, "x");
    }

    #[test]
    fn full_state_snapshot_exposes_entropy_debt() {
        let mut state = GameState::default();
        state.resources.entropy_debt = 12.5;
        let request = AdvisorRequest {
            state: Some(serde_json::to_value(&state).unwrap()),
        };
        assert_eq!(request.entropy_debt(), Some(12.5));
        assert_eq!(AdvisorRequest::default().entropy_debt(), None);
    }
}
