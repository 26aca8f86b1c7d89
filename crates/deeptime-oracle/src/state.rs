//! Shared application state for the oracle server.
//!
//! [`AppState`] holds the injected collaborators: the moderation policy,
//! the narrator, and the rate limiter. It is built once per server and
//! shared with handlers behind an [`Arc`].

use std::sync::Arc;

use crate::moderation::{KeywordPolicy, ModerationPolicy};
use crate::narrator::{MockNarrator, Narrator};
use crate::rate_limit::RateLimiter;

/// Shared state for all oracle handlers.
pub struct AppState {
    /// Text moderation predicate.
    pub moderation: Arc<dyn ModerationPolicy>,
    /// Narration backend.
    pub narrator: Arc<dyn Narrator>,
    /// Per-client request limiter for the simulate and advisor routes.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// State with the keyword policy, the mock narrator, and `rate_limiter`.
    pub fn new(rate_limiter: RateLimiter) -> Self {
        Self {
            moderation: Arc::new(KeywordPolicy::default()),
            narrator: Arc::new(MockNarrator),
            rate_limiter,
        }
    }

    /// Replace the moderation policy.
    #[must_use]
    pub fn with_moderation(mut self, moderation: Arc<dyn ModerationPolicy>) -> Self {
        self.moderation = moderation;
        self
    }

    /// Replace the narrator.
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = narrator;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(RateLimiter::default())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("narrator", &self.narrator.model())
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}
