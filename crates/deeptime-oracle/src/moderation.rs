//! Free-text moderation.
//!
//! Moderation is a boolean predicate over text behind the
//! [`ModerationPolicy`] trait. The shipped [`KeywordPolicy`] blocks any text
//! containing one of a fixed list of phrases, case-insensitively.

use deeptime_types::ModerationVerdict;

/// Phrases the default policy refuses.
pub const BLOCKED_WORDS: [&str; 6] = ["politics", "hate", "harass", "nazi", "election", "real nation"];

/// A moderation predicate.
pub trait ModerationPolicy: Send + Sync {
    /// Judge `text`.
    fn moderate(&self, text: &str) -> ModerationVerdict;
}

/// Substring blocklist, matched against lowercased text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordPolicy {
    blocked: Vec<String>,
}

impl KeywordPolicy {
    /// A policy blocking the given phrases.
    pub fn new(blocked: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            blocked: blocked
                .into_iter()
                .map(|word| word.into().to_lowercase())
                .collect(),
        }
    }

    /// The phrase that blocks `text`, if any.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.blocked
            .iter()
            .find(|word| lowered.contains(word.as_str()))
            .map(String::as_str)
    }
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self::new(BLOCKED_WORDS)
    }
}

impl ModerationPolicy for KeywordPolicy {
    fn moderate(&self, text: &str) -> ModerationVerdict {
        match self.first_match(text) {
            Some(word) => {
                tracing::info!(word, "moderation blocked text");
                ModerationVerdict::blocked()
            }
            None => ModerationVerdict::ok(),
        }
    }
}
