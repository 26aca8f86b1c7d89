//! Era milestones.
//!
//! Each rule names an era flag, a prerequisite era, and a threshold check
//! on the planet. Rules run in order within a single pass, so one pass can
//! unlock a chain of eras if the planet already satisfies all of them.
//! Flags are only ever set; nothing here clears one.

use deeptime_types::GameState;
use tracing::info;

/// An era unlocked during a milestone pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    /// Era flag name in [`GameState::eras`].
    pub era: &'static str,
    /// Timeline line announcing the milestone.
    pub announcement: &'static str,
}

struct MilestoneRule {
    milestone: Milestone,
    requires: Option<&'static str>,
    reached: fn(&GameState) -> bool,
}

const RULES: [MilestoneRule; 5] = [
    MilestoneRule {
        milestone: Milestone {
            era: "microbial",
            announcement: "Microbial life emerges.",
        },
        requires: None,
        reached: |s| {
            s.global.habitability > 25.0 && s.global.ocean_ph > 6.5 && s.global.water_fraction > 0.3
        },
    },
    MilestoneRule {
        milestone: Milestone {
            era: "eukaryotes",
            announcement: "Eukaryote-like cells emerge.",
        },
        requires: Some("microbial"),
        reached: |s| s.global.atmos.o2_percent > 5.0 && s.global.extinction_risk < 60.0,
    },
    MilestoneRule {
        milestone: Milestone {
            era: "multicell",
            announcement: "Multicellular life proliferates.",
        },
        requires: Some("eukaryotes"),
        reached: |s| s.global.atmos.o2_percent > 10.0 && s.global.biodiversity_index > 25.0,
    },
    MilestoneRule {
        milestone: Milestone {
            era: "intelligence",
            announcement: "Intelligence sparks.",
        },
        requires: Some("multicell"),
        reached: |s| s.global.biodiversity_index > 50.0,
    },
    MilestoneRule {
        milestone: Milestone {
            era: "spacefaring",
            announcement: "Spacefaring era unlocked.",
        },
        requires: Some("intelligence"),
        reached: |s| s.global.complexity_potential > 35.0,
    },
];

/// Run every milestone rule once and return the eras unlocked by this pass.
///
/// Reaching `spacefaring` also enables offworld colony launches.
pub fn check_milestones(state: &mut GameState) -> Vec<Milestone> {
    let mut unlocked = Vec::new();
    for rule in &RULES {
        let era = rule.milestone.era;
        if state.era_reached(era) {
            continue;
        }
        let prerequisite_met = rule.requires.is_none_or(|req| state.era_reached(req));
        if !prerequisite_met || !(rule.reached)(state) {
            continue;
        }

        state.eras.insert(era.to_owned(), true);
        if era == "spacefaring" {
            state.offworld.enabled = true;
        }
        info!(era, time_years = state.time_years, "milestone reached");
        unlocked.push(rule.milestone);
    }
    unlocked
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn lush() -> GameState {
        let mut state = GameState::default();
        state.global.habitability = 80.0;
        state.global.ocean_ph = 8.0;
        state.global.water_fraction = 0.7;
        state.global.atmos.o2_percent = 21.0;
        state.global.extinction_risk = 10.0;
        state.global.biodiversity_index = 70.0;
        state.global.complexity_potential = 50.0;
        state
    }

    #[test]
    fn initial_state_reaches_microbial_only() {
        let mut state = GameState::default();
        let unlocked = check_milestones(&mut state);
        let eras: Vec<&str> = unlocked.iter().map(|m| m.era).collect();
        assert_eq!(eras, ["microbial"]);
        assert!(state.era_reached("microbial"));
        assert!(!state.era_reached("eukaryotes"));
    }

    #[test]
    fn lush_planet_unlocks_the_whole_chain_in_order() {
        let mut state = lush();
        let eras: Vec<&str> = check_milestones(&mut state).iter().map(|m| m.era).collect();
        assert_eq!(
            eras,
            ["microbial", "eukaryotes", "multicell", "intelligence", "spacefaring"]
        );
        assert!(state.offworld.enabled);
    }

    #[test]
    fn milestones_fire_once_and_never_unset() {
        let mut state = lush();
        check_milestones(&mut state);

        state.global.habitability = 0.0;
        state.global.biodiversity_index = 0.0;
        state.global.atmos.o2_percent = 0.0;
        assert!(check_milestones(&mut state).is_empty());
        for era in ["microbial", "eukaryotes", "multicell", "intelligence", "spacefaring"] {
            assert!(state.era_reached(era), "{era} was cleared");
        }
        assert!(state.offworld.enabled);
    }

    #[test]
    fn missing_prerequisite_blocks_later_eras() {
        let mut state = lush();
        state.global.ocean_ph = 5.0;
        assert!(check_milestones(&mut state).is_empty());
        assert!(!state.era_reached("intelligence"));
        assert!(!state.offworld.enabled);
    }

    #[test]
    fn thresholds_are_strict() {
        let mut state = GameState::default();
        state.global.habitability = 25.0;
        assert!(check_milestones(&mut state).is_empty());
    }
}
