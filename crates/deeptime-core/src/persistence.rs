//! Save slots.
//!
//! A slot is one pretty-printed JSON file, `<dir>/<slot>.json`, holding a
//! whole [`GameState`]. Slot names are restricted to ASCII letters, digits,
//! `_` and `-` so they can never escape the save directory.

use std::path::{Path, PathBuf};

use deeptime_types::GameState;
use thiserror::Error;
use tracing::info;

/// Slot used when the caller does not name one.
pub const DEFAULT_SLOT: &str = "save_1";

/// Errors from reading or writing save slots.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The slot name contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid save slot name: {0:?}")]
    InvalidSlot(String),

    /// Filesystem failure.
    #[error("save slot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The slot file is not a valid state record.
    #[error("save slot is not a valid state: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

fn slot_path(dir: &Path, slot: &str) -> Result<PathBuf, PersistenceError> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(PersistenceError::InvalidSlot(slot.to_owned()));
    }
    Ok(dir.join(format!("{slot}.json")))
}

/// Write `state` to a slot, creating the save directory if needed.
///
/// Returns the path written.
pub fn save_slot(dir: &Path, slot: &str, state: &GameState) -> Result<PathBuf, PersistenceError> {
    let path = slot_path(dir, slot)?;
    std::fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(&path, json)?;
    info!(slot, path = %path.display(), time_years = state.time_years, "saved");
    Ok(path)
}

/// Read a slot. A slot that was never written is `Ok(None)`.
pub fn load_slot(dir: &Path, slot: &str) -> Result<Option<GameState>, PersistenceError> {
    let path = slot_path(dir, slot)?;
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let state: GameState = serde_json::from_str(&contents)?;
    info!(slot, path = %path.display(), time_years = state.time_years, "loaded");
    Ok(Some(state))
}

/// Names of every slot in `dir`, sorted. A missing directory has no slots.
pub fn list_slots(dir: &Path) -> Result<Vec<String>, PersistenceError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut slots = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            slots.push(stem.to_owned());
        }
    }
    slots.sort();
    Ok(slots)
}
