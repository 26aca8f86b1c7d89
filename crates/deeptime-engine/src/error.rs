//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the run.

use crate::oracle_client::ClientError;

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: deeptime_core::config::ConfigError,
    },

    /// Reading or writing a save slot failed.
    #[error("persistence error: {source}")]
    Persistence {
        /// The underlying persistence error.
        #[from]
        source: deeptime_core::persistence::PersistenceError,
    },

    /// The oracle client could not be built.
    #[error("oracle client error: {source}")]
    Client {
        /// The underlying client error.
        #[from]
        source: ClientError,
    },

    /// The embedded oracle server failed to start.
    #[error("oracle server error: {source}")]
    OracleServer {
        /// The underlying server error.
        #[from]
        source: deeptime_oracle::ServerError,
    },
}
