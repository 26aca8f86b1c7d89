//! Event queue scheduling and offworld colony ageing.
//!
//! The queue lives on [`GameState::queue`] and is kept sorted ascending by
//! `trigger_time_years` after every insertion. Draining only ever pops the
//! front, so it never needs to re-sort.

use deeptime_types::{GameState, QueueEvent};

/// Minimum colony age, in years, before it can count as self-sustaining.
pub const SELF_SUSTAINING_AGE_YEARS: f64 = 10_000.0;

/// Minimum colony stability (exclusive) for self-sufficiency.
pub const SELF_SUSTAINING_STABILITY: f64 = 70.0;

/// Append events to the queue and restore trigger-time order.
///
/// The sort is stable: events with equal trigger times keep their
/// insertion order.
pub fn enqueue_events(state: &mut GameState, events: impl IntoIterator<Item = QueueEvent>) {
    state.queue.extend(events);
    state
        .queue
        .sort_by(|a, b| a.trigger_time_years.total_cmp(&b.trigger_time_years));
}

/// Remove and return every event that is due at the current time.
///
/// Returns the due prefix of the queue in trigger order. Events still in
/// the future stay in place, in their original order.
pub fn drain_triggered_events(state: &mut GameState) -> Vec<QueueEvent> {
    let now = state.time_years;
    let due = state
        .queue
        .iter()
        .take_while(|event| event.trigger_time_years <= now)
        .count();
    state.queue.drain(..due).collect()
}

/// Age every colony and recompute its self-sustaining flag.
///
/// The flag is recomputed from scratch every call, so a colony that loses
/// stability or starts needing imports loses the status again.
pub fn update_colony_ages(state: &mut GameState, dt_years: f64) {
    for colony in &mut state.offworld.colonies {
        colony.age_years += dt_years;
        colony.self_sustaining = colony.stability > SELF_SUSTAINING_STABILITY
            && !colony.imports_needed
            && colony.age_years >= SELF_SUSTAINING_AGE_YEARS;
    }
}

/// Whether any colony has become a lasting, independent civilization.
pub fn has_win_condition(state: &GameState) -> bool {
    state
        .offworld
        .colonies
        .iter()
        .any(|colony| colony.self_sustaining && colony.age_years >= SELF_SUSTAINING_AGE_YEARS)
}

/// Apply a fired event's shock to the biosphere.
///
/// Raises extinction risk by a tenth of the severity and costs
/// biodiversity 8% of it.
pub fn apply_event_impact(state: &mut GameState, event: &QueueEvent) {
    let global = &mut state.global;
    global.extinction_risk = (global.extinction_risk + event.severity * 0.1).min(100.0);
    global.biodiversity_index = (global.biodiversity_index - event.severity * 0.08).max(0.0);
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use deeptime_types::Colony;

    use super::*;

    fn event(id: &str, at: f64) -> QueueEvent {
        QueueEvent {
            id: id.to_owned(),
            trigger_time_years: at,
            event_type: "x".to_owned(),
            severity: 1.0,
            summary: id.to_owned(),
            payload: BTreeMap::new(),
        }
    }

    fn ids(events: &[QueueEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    fn colony(stability: f64, imports_needed: bool, age_years: f64) -> Colony {
        Colony {
            species_id: "sp_1".to_owned(),
            node: "Mars".to_owned(),
            stability,
            self_sustaining: false,
            imports_needed,
            age_years,
        }
    }

    #[test]
    fn orders_and_drains_by_trigger_time() {
        let mut state = GameState::default();
        enqueue_events(&mut state, [event("b", 10.0), event("a", 5.0)]);

        state.time_years = 6.0;
        let triggered = drain_triggered_events(&mut state);
        assert_eq!(ids(&triggered), ["a"]);
        assert_eq!(ids(&state.queue), ["b"]);
    }

    #[test]
    fn queue_stays_sorted_across_many_inserts() {
        let mut state = GameState::default();
        enqueue_events(&mut state, [event("c", 30.0), event("a", 10.0)]);
        enqueue_events(&mut state, [event("d", 40.0), event("b", 20.0)]);
        enqueue_events(&mut state, Vec::<QueueEvent>::new());
        enqueue_events(&mut state, [event("a0", 0.0)]);

        assert_eq!(ids(&state.queue), ["a0", "a", "b", "c", "d"]);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut state = GameState::default();
        enqueue_events(&mut state, [event("first", 5.0), event("second", 5.0)]);
        enqueue_events(&mut state, [event("third", 5.0)]);
        assert_eq!(ids(&state.queue), ["first", "second", "third"]);
    }

    #[test]
    fn drain_removes_exactly_the_due_prefix() {
        let mut state = GameState::default();
        enqueue_events(
            &mut state,
            [event("e", 50.0), event("b", 20.0), event("d", 40.0), event("a", 10.0), event("c", 20.0)],
        );

        state.time_years = 20.0;
        let triggered = drain_triggered_events(&mut state);
        assert_eq!(ids(&triggered), ["a", "b", "c"]);
        assert_eq!(ids(&state.queue), ["d", "e"]);
    }

    #[test]
    fn drain_on_empty_or_future_queue_returns_nothing() {
        let mut state = GameState::default();
        assert!(drain_triggered_events(&mut state).is_empty());

        enqueue_events(&mut state, [event("later", 1.0)]);
        assert!(drain_triggered_events(&mut state).is_empty());
        assert_eq!(state.queue.len(), 1);
    }

    #[test]
    fn colony_crossing_age_threshold_wins() {
        let mut state = GameState::default();
        state.offworld.colonies.push(colony(80.0, false, 9_900.0));
        assert!(!has_win_condition(&state));

        update_colony_ages(&mut state, 200.0);
        assert_eq!(state.offworld.colonies[0].age_years, 10_100.0);
        assert!(state.offworld.colonies[0].self_sustaining);
        assert!(has_win_condition(&state));
    }

    #[test]
    fn colony_loses_status_when_conditions_regress() {
        let mut state = GameState::default();
        state.offworld.colonies.push(colony(80.0, false, 20_000.0));
        update_colony_ages(&mut state, 1.0);
        assert!(state.offworld.colonies[0].self_sustaining);

        state.offworld.colonies[0].imports_needed = true;
        update_colony_ages(&mut state, 1.0);
        assert!(!state.offworld.colonies[0].self_sustaining);
        assert!(!has_win_condition(&state));

        state.offworld.colonies[0].imports_needed = false;
        state.offworld.colonies[0].stability = 70.0;
        update_colony_ages(&mut state, 1.0);
        assert!(!state.offworld.colonies[0].self_sustaining);
    }

    #[test]
    fn event_impact_raises_risk_and_costs_biodiversity() {
        let mut state = GameState::default();
        state.global.extinction_risk = 98.0;
        state.global.biodiversity_index = 1.0;
        let mut shock = event("quake", 0.0);
        shock.severity = 35.0;

        apply_event_impact(&mut state, &shock);
        assert_eq!(state.global.extinction_risk, 100.0);
        assert_eq!(state.global.biodiversity_index, 0.0);
    }
}
