//! Shared type definitions for the Deep Time simulation.
//!
//! This crate is the single source of truth for the persisted world state
//! and the oracle wire contract. Types flow to the browser client as
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`enums`] -- Intervention scope/magnitude and difficulty mode
//! - [`state`] -- [`GameState`] and its nested records
//! - [`update`] -- [`ParsedSimulatorUpdate`], the oracle's structured delta
//! - [`wire`] -- Request/response bodies of the oracle HTTP API

pub mod enums;
pub mod state;
pub mod update;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use enums::{DifficultyMode, Magnitude, Scope};
pub use state::{
    Atmosphere, Colony, DEFAULT_SEED, Difficulty, ERA_NAMES, GameState, GlobalState, HiddenState,
    Offworld, QueueEvent, Resources,
};
pub use update::{ParsedSimulatorUpdate, QueuedEventSpec};
pub use wire::{
    ActionAssumptions, ActionTarget, AdvisorRequest, AdvisorResponse, AdvisorSuggestion,
    DENIAL_NARRATIVE, EconomyEstimate, EventDescription, EventRequest, InterventionRequest,
    ModelMeta, ModerationRequest, ModerationVerdict, PlayerAction, SimulationResponse,
    snapshot_entropy_debt,
};
