//! Configuration loading and typed config structures for Deep Time.
//!
//! The canonical configuration lives in `deeptime-config.yaml` at the
//! workspace root. Every field has a serde default, so a partial file (or
//! no file at all) yields a complete configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable that overrides `oracle.url`.
pub const ORACLE_URL_ENV: &str = "DEEPTIME_ORACLE_URL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `deeptime-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Seed, clock, and difficulty.
    #[serde(default)]
    pub world: WorldConfig,

    /// Economy knobs not fixed by the cost table.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Narration oracle location and limits.
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Save slot location.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Headless run script.
    #[serde(default)]
    pub script: ScriptConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file.
    ///
    /// After parsing, `DEEPTIME_ORACLE_URL` overrides `oracle.url` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// Environment overrides apply either way.
    ///
    /// # Errors
    ///
    /// Same as [`SimulationConfig::from_file`] for a file that exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.oracle.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.oracle.apply_env_overrides();
        Ok(config)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Seed for a fresh state and for the random event roll.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Simulated years per real second at 1x speed.
    #[serde(default = "default_years_per_second")]
    pub years_per_second: f64,

    /// Speed multiplier (the client offers 0.1, 1, 5, 20, 100).
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Real seconds covered by one tick.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,

    /// Prestige level for a fresh state.
    #[serde(default)]
    pub ascension_level: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            years_per_second: default_years_per_second(),
            speed: default_speed(),
            tick_seconds: default_tick_seconds(),
            ascension_level: 0,
        }
    }
}

/// Economy knobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EconomyConfig {
    /// OB charged per offworld colony launch.
    #[serde(default = "default_colony_cost")]
    pub colony_cost: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            colony_cost: default_colony_cost(),
        }
    }
}

/// Narration oracle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OracleConfig {
    /// Base URL the engine sends requests to.
    #[serde(default = "default_oracle_url")]
    pub url: String,

    /// Whether the engine starts the oracle in-process.
    #[serde(default = "default_true")]
    pub embedded: bool,

    /// Port the embedded oracle listens on.
    #[serde(default = "default_oracle_port")]
    pub port: u16,

    /// Requests allowed per client per window on simulate and advisor
    /// routes.
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    /// Rate limit window length in seconds.
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Client-side timeout for one oracle call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl OracleConfig {
    /// Override the oracle URL from `DEEPTIME_ORACLE_URL` when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ORACLE_URL_ENV) {
            self.url = url;
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            url: default_oracle_url(),
            embedded: default_true(),
            port: default_oracle_port(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Save slot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding slot files.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Slot loaded at startup and written at the end of a run.
    #[serde(default = "default_slot")]
    pub slot: String,

    /// Write the slot every this many ticks. Zero disables autosave.
    #[serde(default)]
    pub autosave_every_ticks: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            slot: default_slot(),
            autosave_every_ticks: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Headless run script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptConfig {
    /// Ticks to run before stopping.
    #[serde(default = "default_script_ticks")]
    pub ticks: u64,

    /// Real milliseconds to sleep between ticks. Zero runs flat out.
    #[serde(default)]
    pub tick_interval_ms: u64,

    /// Interventions issued at fixed ticks.
    #[serde(default)]
    pub interventions: Vec<ScriptedIntervention>,

    /// Ask the advisor every this many ticks. Zero disables it.
    #[serde(default)]
    pub advisor_every_ticks: u64,

    /// Launch a colony whenever offworld is enabled and affordable.
    #[serde(default = "default_true")]
    pub launch_colonies: bool,

    /// Ask the oracle to narrate natural events and apply its delta.
    #[serde(default)]
    pub narrate_events: bool,

    /// Stop early once the win condition holds.
    #[serde(default = "default_true")]
    pub stop_on_win: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            ticks: default_script_ticks(),
            tick_interval_ms: 0,
            interventions: Vec::new(),
            advisor_every_ticks: 0,
            launch_colonies: default_true(),
            narrate_events: false,
            stop_on_win: default_true(),
        }
    }
}

/// One scripted intervention.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptedIntervention {
    /// Tick number (starting at 1) on which to issue it.
    pub at_tick: u64,
    /// The player's action text.
    pub text: String,
}

const fn default_seed() -> u64 {
    deeptime_types::DEFAULT_SEED
}

const fn default_years_per_second() -> f64 {
    100_000.0
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_tick_seconds() -> f64 {
    0.25
}

const fn default_colony_cost() -> f64 {
    crate::offworld::DEFAULT_COLONY_COST
}

fn default_oracle_url() -> String {
    "http://127.0.0.1:8787".to_owned()
}

const fn default_oracle_port() -> u16 {
    8787
}

const fn default_rate_limit_max_requests() -> u32 {
    30
}

const fn default_rate_limit_window_secs() -> u64 {
    600
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("saves")
}

fn default_slot() -> String {
    crate::persistence::DEFAULT_SLOT.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_script_ticks() -> u64 {
    400
}

const fn default_true() -> bool {
    true
}
