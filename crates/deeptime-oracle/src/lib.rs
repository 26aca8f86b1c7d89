//! Narration oracle for the Deep Time simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Moderation** (`/api/moderate`) behind the
//!   [`ModerationPolicy`](moderation::ModerationPolicy) trait
//! - **Narration** (`/api/simulate/intervention`, `/api/simulate/event`)
//!   returning prose with an embedded update block plus the structured
//!   delta
//! - **Advice** (`/api/advisor`) with safe and chaos suggestions
//!
//! Narration and advice are rate limited per client by an injected
//! [`RateLimiter`](rate_limit::RateLimiter). The shipped narrator is a
//! deterministic keyword model.

pub mod advisor;
pub mod error;
pub mod handlers;
pub mod moderation;
pub mod narrator;
pub mod rate_limit;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::OracleError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, spawn_oracle, start_server};
pub use state::AppState;
