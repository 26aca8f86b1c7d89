//! The headless play session.
//!
//! A [`Session`] owns the single [`GameState`] for the run, the random
//! generator for natural events, and the oracle client. It replays what
//! the browser client does: tick on a fixed cadence, issue interventions
//! between ticks, launch colonies when possible, and keep a timeline.

use std::collections::HashMap;
use std::time::Duration;

use deeptime_core::config::SimulationConfig;
use deeptime_core::intervention::{
    InterventionError, Resolution, ensure_affordable, plan_intervention, resolve_intervention,
};
use deeptime_core::mutate::apply_simulator_update;
use deeptime_core::offworld::launch_colony;
use deeptime_core::parse::narrative_text;
use deeptime_core::persistence::save_slot;
use deeptime_core::simulation::compute_dt_years;
use deeptime_core::tick::{TickSummary, run_tick};
use deeptime_types::{DENIAL_NARRATIVE, GameState, InterventionRequest};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::oracle_client::{ClientError, OracleClient, state_snapshot};

/// Timeline entries kept; older ones are dropped.
const TIMELINE_CAPACITY: usize = 200;

/// What became of one intervention attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum InterventionOutcome {
    /// Moderation refused the text. Nothing was charged.
    Denied,
    /// The player could not pay. Nothing was charged.
    Unaffordable {
        /// Planned cost.
        cost: f64,
        /// OB available.
        available: f64,
    },
    /// The text was blank.
    Empty,
    /// The oracle could not be reached. Nothing was charged.
    OracleUnavailable,
    /// The intervention was paid for and applied.
    Applied {
        /// Whether the oracle's delta or the local fallback was used.
        resolution: Resolution,
        /// Planned cost sent to the oracle.
        cost: f64,
    },
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Ticks actually run.
    pub ticks: u64,
    /// Simulated time at the end.
    pub time_years: f64,
    /// Events that fired.
    pub events_triggered: usize,
    /// Interventions that were paid for and applied.
    pub interventions_applied: usize,
    /// Colonies founded during the run.
    pub colonies_launched: usize,
    /// Eras reached by the end, in unlock order.
    pub eras: Vec<String>,
    /// Whether the win condition held at the end.
    pub won: bool,
}

/// One play session.
#[derive(Debug)]
pub struct Session {
    state: GameState,
    rng: StdRng,
    client: OracleClient,
    repeats: HashMap<String, i64>,
    timeline: Vec<String>,
}

impl Session {
    /// Start a session on `state`. Natural events are seeded from the
    /// state's seed.
    pub fn new(state: GameState, client: OracleClient) -> Self {
        let rng = StdRng::seed_from_u64(state.seed);
        Self {
            state,
            rng,
            client,
            repeats: HashMap::new(),
            timeline: vec!["Earth boots at 1B years old. The cosmos yawns.".to_owned()],
        }
    }

    /// The world state.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Timeline entries, newest first.
    pub fn timeline(&self) -> &[String] {
        &self.timeline
    }

    fn log(&mut self, entry: String) {
        self.timeline.insert(0, entry);
        self.timeline.truncate(TIMELINE_CAPACITY);
    }

    /// Advance one tick of `dt_years`, optionally narrating natural events.
    pub async fn tick(&mut self, dt_years: f64, narrate_events: bool) -> TickSummary {
        let summary = run_tick(&mut self.state, dt_years, &mut self.rng);

        for event in &summary.triggered {
            self.log(format!("Event: {}", event.summary));
            if narrate_events && event.event_type == "natural" {
                self.narrate_event(&event.summary).await;
            }
        }
        for milestone in &summary.milestones {
            self.log(format!("Milestone: {}", milestone.announcement));
        }
        summary
    }

    async fn narrate_event(&mut self, summary: &str) {
        match self.client.simulate_event(Some(summary)).await {
            Ok(response) => {
                if let Some(update) = response.parsed_update.filter(|_| response.parse_ok) {
                    apply_simulator_update(&mut self.state, &update, 0.0);
                }
                self.log(narrative_text(&response.raw_text).to_owned());
            }
            Err(e) => warn!(error = %e, "event narration failed"),
        }
    }

    /// Attempt a player intervention.
    ///
    /// Moderation, planning, and the affordability check all happen before
    /// the oracle is asked to narrate; a refusal at any of those steps
    /// leaves the state untouched.
    pub async fn intervene(&mut self, text: &str, cells: Vec<u32>) -> InterventionOutcome {
        match self.client.moderate(text).await {
            Ok(verdict) if !verdict.allowed => {
                self.log(DENIAL_NARRATIVE.to_owned());
                return InterventionOutcome::Denied;
            }
            Ok(_) => {}
            Err(e) => return self.oracle_unavailable(&e),
        }

        let key = text.trim().to_lowercase();
        let repeated = self.repeats.get(&key).copied();
        let checked = plan_intervention(text, &self.state, repeated)
            .and_then(|plan| ensure_affordable(&self.state, &plan).map(|()| plan));
        let plan = match checked {
            Ok(plan) => plan,
            Err(InterventionError::EmptyAction) => return InterventionOutcome::Empty,
            Err(InterventionError::InsufficientBudget { cost, available }) => {
                self.log(format!("Insufficient OB: need {cost}."));
                return InterventionOutcome::Unaffordable { cost, available };
            }
        };

        let request = InterventionRequest {
            state: state_snapshot(&self.state),
            player_action: plan.player_action(cells),
            economy: plan.economy(),
        };
        let response = match self.client.simulate_intervention(&request).await {
            Ok(response) => response,
            Err(e) => return self.oracle_unavailable(&e),
        };
        if response.moderation.as_ref().is_some_and(|m| !m.allowed) {
            self.log(DENIAL_NARRATIVE.to_owned());
            return InterventionOutcome::Denied;
        }

        let resolution = resolve_intervention(&mut self.state, &plan, &response);
        let count = self.repeats.entry(key).or_insert(0);
        *count = count.saturating_add(1);

        self.log(format!("Intervention: {}", plan.text));
        let narrative = narrative_text(&response.raw_text);
        self.log(if narrative.is_empty() {
            "Reality wobbles.".to_owned()
        } else {
            narrative.to_owned()
        });

        InterventionOutcome::Applied {
            resolution,
            cost: plan.cost,
        }
    }

    fn oracle_unavailable(&mut self, error: &ClientError) -> InterventionOutcome {
        warn!(error = %error, "oracle unavailable, intervention skipped");
        self.log("The oracle is silent.".to_owned());
        InterventionOutcome::OracleUnavailable
    }

    /// Ask the advisor for suggestions and log them.
    pub async fn consult_advisor(&mut self) {
        match self.client.advisor(&self.state).await {
            Ok(response) => {
                let lines: Vec<String> = response
                    .suggestions
                    .iter()
                    .map(|s| format!("- [{}] {} ({}, {})", s.mode, s.text, s.expected_risk, s.ob_cost))
                    .collect();
                self.log(format!("Advisor\n{}", lines.join("\n")));
            }
            Err(e) => warn!(error = %e, "advisor unavailable"),
        }
    }

    /// Launch a colony if offworld is unlocked and affordable.
    ///
    /// Returns whether a colony was founded.
    pub fn try_launch_colony(&mut self, cost: f64) -> bool {
        if !self.state.offworld.enabled || self.state.resources.ob_current < cost {
            return false;
        }
        match launch_colony(&mut self.state, cost) {
            Ok(_) => {
                self.log("An offworld colony mission launches.".to_owned());
                true
            }
            Err(e) => {
                warn!(error = %e, "colony launch refused");
                false
            }
        }
    }

    /// Run the configured script to completion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Persistence`] if an autosave fails.
    pub async fn run(&mut self, config: &SimulationConfig) -> Result<RunSummary, EngineError> {
        let world = &config.world;
        let script = &config.script;
        let dt_years = compute_dt_years(world.tick_seconds, world.years_per_second, world.speed);
        info!(
            dt_years,
            ticks = script.ticks,
            interventions = script.interventions.len(),
            "run starting"
        );

        let mut summary = RunSummary {
            ticks: 0,
            time_years: self.state.time_years,
            events_triggered: 0,
            interventions_applied: 0,
            colonies_launched: 0,
            eras: Vec::new(),
            won: false,
        };

        for tick in 1..=script.ticks {
            let tick_summary = self.tick(dt_years, script.narrate_events).await;
            summary.ticks = tick;
            summary.events_triggered = summary
                .events_triggered
                .saturating_add(tick_summary.triggered.len());

            for scripted in script.interventions.iter().filter(|i| i.at_tick == tick) {
                let outcome = self.intervene(&scripted.text, vec![0]).await;
                info!(tick, text = %scripted.text, ?outcome, "scripted intervention");
                if matches!(outcome, InterventionOutcome::Applied { .. }) {
                    summary.interventions_applied = summary.interventions_applied.saturating_add(1);
                }
            }

            if tick.checked_rem(script.advisor_every_ticks) == Some(0) {
                self.consult_advisor().await;
            }

            if script.launch_colonies && self.try_launch_colony(config.economy.colony_cost) {
                summary.colonies_launched = summary.colonies_launched.saturating_add(1);
            }

            if tick.checked_rem(config.persistence.autosave_every_ticks) == Some(0) {
                save_slot(&config.persistence.save_dir, &config.persistence.slot, &self.state)?;
            }

            if tick_summary.won && script.stop_on_win {
                info!(tick, time_years = self.state.time_years, "win condition reached");
                break;
            }

            if script.tick_interval_ms > 0 {
                tokio::time::sleep(Duration::from_millis(script.tick_interval_ms)).await;
            }
        }

        summary.time_years = self.state.time_years;
        summary.eras = deeptime_types::ERA_NAMES
            .iter()
            .filter(|era| self.state.era_reached(era))
            .map(|era| (*era).to_owned())
            .collect();
        summary.won = deeptime_core::events::has_win_condition(&self.state);
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use deeptime_core::config::ScriptedIntervention;
    use deeptime_oracle::{AppState, ServerConfig, spawn_oracle};

    use super::*;

    async fn oracle() -> OracleClient {
        let config = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
        };
        let (_handle, addr): (_, SocketAddr) =
            spawn_oracle(&config, Arc::new(AppState::default())).await.unwrap();
        OracleClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn applied_intervention_charges_final_cost() {
        let mut session = Session::new(GameState::default(), oracle().await);
        let outcome = session.intervene("Seed the ocean with life", vec![3]).await;

        assert_eq!(
            outcome,
            InterventionOutcome::Applied {
                resolution: Resolution::OracleDelta,
                cost: 10.0
            }
        );
        let state = session.state();
        assert_eq!(state.resources.ob_current, 90.0);
        assert_eq!(state.resources.entropy_debt, 6.0);
        assert_eq!(state.global.biodiversity_index, 9.0);
        assert_eq!(state.queue.len(), 1);
        assert_eq!(
            session.timeline()[0],
            "You twist the world and reality grudgingly complies."
        );
    }

    #[tokio::test]
    async fn denied_intervention_changes_nothing() {
        let mut session = Session::new(GameState::default(), oracle().await);
        let before = session.state().clone();
        let outcome = session.intervene("Stage a nazi rally", vec![0]).await;
        assert_eq!(outcome, InterventionOutcome::Denied);
        assert_eq!(session.state(), &before);
        assert_eq!(session.timeline()[0], DENIAL_NARRATIVE);
    }

    #[tokio::test]
    async fn unaffordable_intervention_is_refused_locally() {
        let mut state = GameState::default();
        state.resources.ob_current = 5.0;
        let mut session = Session::new(state, oracle().await);
        let outcome = session.intervene("Reshape the planet", vec![0]).await;
        assert_eq!(
            outcome,
            InterventionOutcome::Unaffordable {
                cost: 55.0,
                available: 5.0
            }
        );
        assert_eq!(session.state().resources.ob_current, 5.0);
        assert_eq!(session.timeline()[0], "Insufficient OB: need 55.");
    }

    #[tokio::test]
    async fn blank_intervention_is_rejected_before_planning() {
        let mut session = Session::new(GameState::default(), oracle().await);
        let before = session.state().clone();
        let outcome = session.intervene("   ", vec![0]).await;
        assert_eq!(outcome, InterventionOutcome::Empty);
        assert_eq!(session.state(), &before);
    }

    #[tokio::test]
    async fn repeated_actions_cost_more() {
        let mut session = Session::new(GameState::default(), oracle().await);
        session.intervene("stir", vec![0]).await;
        let outcome = session.intervene("STIR", vec![0]).await;
        // 10 base, 1.2x for one repeat, plus the debt left by the first call.
        let InterventionOutcome::Applied { cost, .. } = outcome else {
            panic!("expected an applied intervention, got {outcome:?}");
        };
        assert!(cost > 10.0);
    }

    #[tokio::test]
    async fn unreachable_oracle_skips_without_charge() {
        let client = OracleClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let mut session = Session::new(GameState::default(), client);
        let outcome = session.intervene("anything", vec![0]).await;
        assert_eq!(outcome, InterventionOutcome::OracleUnavailable);
        assert_eq!(session.state().resources.ob_current, 100.0);
    }

    #[tokio::test]
    async fn scripted_run_advances_time_and_saves() {
        let save_dir = std::env::temp_dir().join(format!("deeptime-run-{}", uuid::Uuid::new_v4().simple()));
        let mut config = SimulationConfig::default();
        config.script.ticks = 20;
        config.script.advisor_every_ticks = 10;
        config.script.interventions = vec![ScriptedIntervention {
            at_tick: 5,
            text: "warm the region a small amount".to_owned(),
        }];
        config.persistence.save_dir = save_dir.clone();
        config.persistence.autosave_every_ticks = 10;

        let mut session = Session::new(GameState::default(), oracle().await);
        let summary = session.run(&config).await.unwrap();

        assert_eq!(summary.ticks, 20);
        // 20 ticks of 0.25 s at 100k years/s.
        assert!((summary.time_years - 500_000.0).abs() < 1e-6);
        assert_eq!(summary.interventions_applied, 1);
        assert!(summary.eras.contains(&"microbial".to_owned()));
        assert!(session.timeline().iter().any(|line| line.starts_with("Advisor\n")));

        let saved = deeptime_core::persistence::load_slot(&save_dir, "save_1").unwrap();
        assert!(saved.is_some());
        std::fs::remove_dir_all(&save_dir).unwrap();
    }

    #[tokio::test]
    async fn colonies_launch_once_spacefaring() {
        let mut state = GameState::default();
        state.offworld.enabled = true;
        let mut session = Session::new(state, oracle().await);
        assert!(session.try_launch_colony(30.0));
        assert!(session.try_launch_colony(30.0));
        assert!(session.try_launch_colony(30.0));
        assert!(!session.try_launch_colony(30.0));
        assert_eq!(session.state().offworld.colonies.len(), 3);
        assert_eq!(session.state().resources.ob_current, 10.0);
    }
}
