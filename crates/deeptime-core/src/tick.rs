//! One simulation tick.
//!
//! [`run_tick`] is the full per-tick pipeline: baseline physics, resource
//! drift, colony ageing, a random natural-event roll, queue draining with
//! event impacts, milestone checks, and a final clamp.

use deeptime_types::{GameState, QueueEvent};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::economy::apply_resource_drift;
use crate::events::{
    apply_event_impact, drain_triggered_events, enqueue_events, has_win_condition,
    update_colony_ages,
};
use crate::milestones::{Milestone, check_milestones};
use crate::simulation::{YEARS_PER_MYR, clamp_global_state, step_baseline};

/// Natural events per million years at zero entropy debt.
pub const NATURAL_EVENT_RATE_PER_MYR: f64 = 0.08;

/// Severity of a random natural event.
pub const NATURAL_EVENT_SEVERITY: f64 = 35.0;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// Simulated time after the tick.
    pub time_years: f64,
    /// Simulated years covered by the tick.
    pub dt_years: f64,
    /// Events that fired, in trigger order.
    pub triggered: Vec<QueueEvent>,
    /// Eras unlocked during the tick.
    pub milestones: Vec<Milestone>,
    /// Whether a colony has become self-sustaining.
    pub won: bool,
}

/// Probability that a natural event fires during a tick of `dt_years`.
///
/// Entropy debt raises the rate linearly: 100 debt doubles it.
pub fn natural_event_probability(entropy_debt: f64, dt_years: f64) -> f64 {
    NATURAL_EVENT_RATE_PER_MYR * (1.0 + entropy_debt / 100.0) * (dt_years / YEARS_PER_MYR)
}

/// Roll for a random natural event and schedule it at the current time.
///
/// Returns whether an event was scheduled.
pub fn maybe_spawn_natural_event<R: Rng + ?Sized>(
    state: &mut GameState,
    dt_years: f64,
    rng: &mut R,
) -> bool {
    let probability = natural_event_probability(state.resources.entropy_debt, dt_years);
    if rng.random::<f64>() >= probability {
        return false;
    }

    let event = QueueEvent {
        id: format!("rnd_{}", Uuid::new_v4().simple()),
        trigger_time_years: state.time_years,
        event_type: "natural".to_owned(),
        severity: NATURAL_EVENT_SEVERITY,
        summary: "A random cosmic disruption rocks the biosphere.".to_owned(),
        payload: Default::default(),
    };
    debug!(id = %event.id, time_years = state.time_years, "natural event scheduled");
    enqueue_events(state, [event]);
    true
}

/// Advance the world by one tick of `dt_years`.
pub fn run_tick<R: Rng + ?Sized>(state: &mut GameState, dt_years: f64, rng: &mut R) -> TickSummary {
    step_baseline(state, dt_years);

    let drift = apply_resource_drift(
        state.resources.ob_current,
        state.resources.ob_max,
        state.resources.entropy_debt,
        dt_years,
        state.difficulty.ascension_level,
    );
    state.resources.ob_current = drift.ob;
    state.resources.entropy_debt = drift.ed;

    update_colony_ages(state, dt_years);
    maybe_spawn_natural_event(state, dt_years, rng);

    let triggered = drain_triggered_events(state);
    for event in &triggered {
        info!(
            id = %event.id,
            event_type = %event.event_type,
            severity = event.severity,
            summary = %event.summary,
            "event triggered"
        );
        apply_event_impact(state, event);
    }

    let milestones = check_milestones(state);
    clamp_global_state(state);

    TickSummary {
        time_years: state.time_years,
        dt_years,
        triggered,
        milestones,
        won: has_win_condition(state),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn queued(id: &str, at: f64, severity: f64) -> QueueEvent {
        QueueEvent {
            id: id.to_owned(),
            trigger_time_years: at,
            event_type: "player_consequence".to_owned(),
            severity,
            summary: id.to_owned(),
            payload: BTreeMap::new(),
        }
    }

    #[test]
    fn probability_scales_with_debt_and_dt() {
        assert!((natural_event_probability(0.0, 1_000_000.0) - 0.08).abs() < 1e-12);
        assert!((natural_event_probability(100.0, 1_000_000.0) - 0.16).abs() < 1e-12);
        assert_eq!(natural_event_probability(50.0, 0.0), 0.0);
    }

    #[test]
    fn certain_roll_schedules_a_natural_event() {
        let mut state = GameState::default();
        let mut rng = StdRng::seed_from_u64(state.seed);
        assert!(maybe_spawn_natural_event(&mut state, 20_000_000.0, &mut rng));
        assert_eq!(state.queue.len(), 1);
        assert_eq!(state.queue[0].event_type, "natural");
        assert_eq!(state.queue[0].severity, NATURAL_EVENT_SEVERITY);
        assert!(state.queue[0].id.starts_with("rnd_"));
    }

    #[test]
    fn zero_length_tick_never_rolls_an_event() {
        let mut state = GameState::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!(!maybe_spawn_natural_event(&mut state, 0.0, &mut rng));
        }
        assert!(state.queue.is_empty());
    }

    #[test]
    fn due_event_perturbs_risk_and_biodiversity() {
        let mut state = GameState::default();
        state.global.biodiversity_index = 40.0;
        enqueue_events(&mut state, [queued("now", 0.5, 50.0), queued("later", 5_000.0, 50.0)]);
        let mut rng = StdRng::seed_from_u64(9);

        let summary = run_tick(&mut state, 1.0, &mut rng);

        assert_eq!(summary.time_years, 1.0);
        assert_eq!(summary.triggered.len(), 1);
        assert_eq!(summary.triggered[0].id, "now");
        assert_eq!(state.queue.len(), 1);
        assert!((state.global.extinction_risk - 30.0).abs() < 1e-3);
        assert!((state.global.biodiversity_index - 36.0).abs() < 1e-3);
    }

    #[test]
    fn tick_reports_milestones_and_keeps_domains() {
        let mut state = GameState::default();
        state.global.habitability = 140.0;
        let mut rng = StdRng::seed_from_u64(3);

        let summary = run_tick(&mut state, 10.0, &mut rng);

        assert_eq!(summary.milestones.first().map(|m| m.era), Some("microbial"));
        assert_eq!(state.global.habitability, 100.0);
        assert!(!summary.won);
    }

    #[test]
    fn resource_drift_is_written_back() {
        let mut state = GameState::default();
        state.resources.ob_current = 10.0;
        state.resources.entropy_debt = 40.0;
        let mut rng = StdRng::seed_from_u64(5);

        run_tick(&mut state, 1_000_000.0, &mut rng);

        assert!(state.resources.ob_current > 10.0);
        assert!(state.resources.entropy_debt < 40.0);
    }
}
