//! Extraction of structured deltas from oracle narratives.
//!
//! The oracle answers with free prose that may carry exactly one block
//! delimited by [`UPDATE_START`] and [`UPDATE_END`]. The text between the
//! markers is JSON for a [`ParsedSimulatorUpdate`].
//!
//! Failure is all-or-nothing: a missing marker or malformed JSON yields no
//! data at all. No repair is attempted.

use deeptime_types::ParsedSimulatorUpdate;
use tracing::warn;

/// Opening sentinel of an update block.
pub const UPDATE_START: &str = "---UPDATE_JSON---";

/// Closing sentinel of an update block.
pub const UPDATE_END: &str = "---END_UPDATE_JSON---";

/// Why a narrative did not yield an update.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// One of the markers is missing, or the end marker does not follow
    /// the start marker.
    #[error("no update block found")]
    MissingBlock,

    /// The block is valid JSON but not an object.
    #[error("update block is not a JSON object")]
    NotAnObject,

    /// The block was found but is not a valid update.
    #[error("malformed update block: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result of [`parse_simulator_update`].
///
/// Either carries a complete update or nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseOutcome {
    parsed_update: Option<ParsedSimulatorUpdate>,
}

impl ParseOutcome {
    /// Whether an update was decoded.
    pub const fn parse_ok(&self) -> bool {
        self.parsed_update.is_some()
    }

    /// The decoded update, if any.
    pub const fn parsed_update(&self) -> Option<&ParsedSimulatorUpdate> {
        self.parsed_update.as_ref()
    }

    /// Consume the outcome, yielding the update if one was decoded.
    pub fn into_update(self) -> Option<ParsedSimulatorUpdate> {
        self.parsed_update
    }
}

/// Locate the update block and return its trimmed contents.
///
/// Uses the first occurrence of each marker. Returns `None` unless both
/// are present with the end strictly after the start.
pub fn extract_update_block(raw: &str) -> Option<&str> {
    let start = raw.find(UPDATE_START)?;
    let end = raw.find(UPDATE_END)?;
    if end <= start {
        return None;
    }
    let body_start = start.checked_add(UPDATE_START.len())?;
    raw.get(body_start..end).map(str::trim)
}

/// Decode the update block of a narrative.
///
/// # Errors
///
/// Returns [`ParseError::MissingBlock`] if the markers are absent or out of
/// order, [`ParseError::NotAnObject`] if the block holds an array or a
/// scalar, and [`ParseError::Malformed`] if it is not a valid update.
pub fn try_parse_simulator_update(raw: &str) -> Result<ParsedSimulatorUpdate, ParseError> {
    let block = extract_update_block(raw).ok_or(ParseError::MissingBlock)?;
    let value: serde_json::Value = serde_json::from_str(block)?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// Decode the update block of a narrative, reporting failure as a flag.
///
/// Failures are expected (the narrator is free text) and are logged at
/// `warn`, never propagated.
pub fn parse_simulator_update(raw: &str) -> ParseOutcome {
    match try_parse_simulator_update(raw) {
        Ok(update) => ParseOutcome {
            parsed_update: Some(update),
        },
        Err(e) => {
            warn!(error = %e, "no usable update block in narrative");
            ParseOutcome::default()
        }
    }
}

/// Render an update as a delimited block for embedding in a narrative.
///
/// # Errors
///
/// Returns the serializer error if the update cannot be encoded.
pub fn render_update_block(update: &ParsedSimulatorUpdate) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(update)?;
    Ok(format!("{UPDATE_START}\n{json}\n{UPDATE_END}"))
}

/// The prose portion of a narrative, without the update block.
pub fn narrative_text(raw: &str) -> &str {
    raw.split(UPDATE_START).next().unwrap_or(raw).trim()
}
