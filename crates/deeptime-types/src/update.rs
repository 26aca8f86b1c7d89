//! Structured deltas produced by the narration oracle.
//!
//! A [`ParsedSimulatorUpdate`] is transient: it is decoded from a narrative,
//! merged into the [`GameState`](crate::GameState) once, and dropped.
//!
//! Delta values are kept as raw JSON so that an entry with the wrong type
//! does not fail the whole decode. The mutator skips anything that is not
//! a number. A `null` collection reads as empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Additive adjustments to the world state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParsedSimulatorUpdate {
    /// Final OB cost. When absent the caller's estimate is charged.
    #[serde(default)]
    #[ts(optional)]
    pub ob_cost_final: Option<f64>,
    /// Change to entropy debt. Absent means zero.
    #[serde(default)]
    #[ts(optional)]
    pub entropy_debt_delta: Option<f64>,
    /// Per-field deltas for the visible planetary scalars.
    #[serde(default, deserialize_with = "null_as_default")]
    pub global_deltas: BTreeMap<String, serde_json::Value>,
    /// Per-field deltas for the hidden scalars.
    #[serde(default, deserialize_with = "null_as_default")]
    pub hidden_deltas: BTreeMap<String, serde_json::Value>,
    /// Events to schedule relative to the current simulated time.
    #[serde(default, deserialize_with = "null_as_default")]
    pub queue_add: Vec<QueuedEventSpec>,
    /// Flavor notes for the player. Not applied to state.
    ///
    /// A bare string reads as a single note; non-string entries are dropped.
    #[serde(default, deserialize_with = "lenient_notes")]
    pub notes_for_player: Vec<String>,
}

impl ParsedSimulatorUpdate {
    /// An update that only adds entropy debt.
    ///
    /// Used as the local fallback when the oracle returns no usable delta.
    pub fn entropy_only(entropy_debt_delta: f64) -> Self {
        Self {
            entropy_debt_delta: Some(entropy_debt_delta),
            ..Self::default()
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_notes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let notes = match Value::deserialize(deserializer)? {
        Value::String(note) => vec![note],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(note) => Some(note),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(notes)
}

/// An event to schedule, expressed relative to the time of application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QueuedEventSpec {
    /// Years from now until the event fires.
    pub trigger_in_years: f64,
    /// Event category.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Severity, conventionally 0-100.
    pub severity: f64,
    /// One-line description for the timeline.
    pub summary: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn sparse_update_decodes_with_defaults() {
        let update: ParsedSimulatorUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update, ParsedSimulatorUpdate::default());
    }

    #[test]
    fn mismatched_delta_values_still_decode() {
        let json = r#"{"global_deltas":{"mean_temp_c":"hot","ocean_ph":-0.5}}"#;
        let update: ParsedSimulatorUpdate = serde_json::from_str(json).unwrap();
        assert!(update.global_deltas["mean_temp_c"].is_string());
        assert_eq!(update.global_deltas["ocean_ph"].as_f64(), Some(-0.5));
    }

    #[test]
    fn null_collections_decode_as_empty() {
        let json = r#"{
            "ob_cost_final": 10,
            "global_deltas": null,
            "hidden_deltas": null,
            "queue_add": null,
            "notes_for_player": null
        }"#;
        let update: ParsedSimulatorUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.ob_cost_final, Some(10.0));
        assert!(update.global_deltas.is_empty());
        assert!(update.hidden_deltas.is_empty());
        assert!(update.queue_add.is_empty());
        assert!(update.notes_for_player.is_empty());
    }

    #[test]
    fn player_notes_accept_a_bare_string() {
        let update: ParsedSimulatorUpdate =
            serde_json::from_str(r#"{"notes_for_player":"careful"}"#).unwrap();
        assert_eq!(update.notes_for_player, vec!["careful".to_owned()]);

        let update: ParsedSimulatorUpdate =
            serde_json::from_str(r#"{"notes_for_player":{"text":"odd"}}"#).unwrap();
        assert!(update.notes_for_player.is_empty());
    }

    #[test]
    fn entropy_only_leaves_cost_unset() {
        let update = ParsedSimulatorUpdate::entropy_only(8.8);
        assert_eq!(update.ob_cost_final, None);
        assert_eq!(update.entropy_debt_delta, Some(8.8));
        assert!(update.queue_add.is_empty());
    }
}
