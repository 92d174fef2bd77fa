use serde::{Deserialize, Serialize};

use crate::core::{MatchRules, RulesError, TowerArchetype, TowerTypeId};
use crate::timer::Countdown;

/// Spell casts left for a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellCasts {
    Limited(u32),
    Infinite,
}

impl SpellCasts {
    /// True when at least one cast is left.
    #[must_use]
    pub fn any(self) -> bool {
        match self {
            Self::Limited(n) => n > 0,
            Self::Infinite => true,
        }
    }
}

/// Read-only copy of the match rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesSnapshot {
    pub action_phase_time: Countdown,
    /// Ceiling bonus time may not exceed.
    pub max_action_phase_time: u32,
    pub action_time_bonus: u32,
    pub quick_effect_selection_time: u32,
    pub bonus_spell_selection_time: u32,
    pub min_tile_movements: u32,
    pub max_tile_movements: u32,
    pub max_spell_casts: Option<u32>,
    pub max_builds_per_turn: u32,
    pub max_num_towers: u32,
    pub max_num_duplicated_towers: u32,
    pub max_num_duplicated_tower_types: u32,
    pub max_num_legendary_towers: u32,
    pub max_build_range: u32,
    pub available_towers: Vec<TowerArchetype>,
}

impl RulesSnapshot {
    /// Validate and copy configured rules.
    pub fn capture(rules: &MatchRules) -> Result<Self, RulesError> {
        rules.validate()?;

        let action_phase_time = Countdown::from_seconds(rules.action_phase_time).ok_or_else(|| {
            RulesError::InvalidRules(format!("action phase time {}", rules.action_phase_time))
        })?;
        let max_action_phase_time = rules
            .max_action_phase_time
            .or_else(|| action_phase_time.seconds())
            .unwrap_or(u32::MAX);

        Ok(Self {
            action_phase_time,
            max_action_phase_time,
            action_time_bonus: rules.action_time_bonus,
            quick_effect_selection_time: rules.quick_effect_selection_time,
            bonus_spell_selection_time: rules.bonus_spell_selection_time,
            min_tile_movements: rules.min_tile_movements,
            max_tile_movements: rules.max_tile_movements,
            max_spell_casts: rules.max_spell_casts,
            max_builds_per_turn: rules.max_builds_per_turn,
            max_num_towers: rules.max_num_towers,
            max_num_duplicated_towers: rules.max_num_duplicated_towers,
            max_num_duplicated_tower_types: rules.max_num_duplicated_tower_types,
            max_num_legendary_towers: rules.max_num_legendary_towers,
            max_build_range: rules.max_build_range,
            available_towers: rules.available_towers.clone(),
        })
    }

    #[must_use]
    pub fn is_action_phase_timed(&self) -> bool {
        !self.action_phase_time.is_infinite()
    }

    /// Look up an archetype available this match.
    #[must_use]
    pub fn tower(&self, id: TowerTypeId) -> Option<&TowerArchetype> {
        self.available_towers.iter().find(|t| t.id == id)
    }

    /// Add `bonus` to `time`, clamped by the action phase ceiling.
    #[must_use]
    pub fn time_with_bonus(&self, time: Countdown, bonus: u32) -> Countdown {
        time.with_bonus(bonus, self.max_action_phase_time)
    }

    /// Time for a fresh action phase with `earned` bonus seconds.
    #[must_use]
    pub fn action_phase_duration(&self, earned: u32) -> Countdown {
        self.time_with_bonus(self.action_phase_time, earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::INFINITE_TIME;

    #[test]
    fn test_capture_copies_limits() {
        let rules = MatchRules::new()
            .with_action_phase_time(60)
            .with_tile_movements(1, 3)
            .with_tower(TowerArchetype::new(TowerTypeId::new(4), "Archer", 10));
        let snapshot = RulesSnapshot::capture(&rules).unwrap();

        assert_eq!(snapshot.action_phase_time, Countdown::Finite(60));
        assert_eq!(snapshot.max_action_phase_time, 60);
        assert_eq!(snapshot.max_tile_movements, 3);
        assert!(snapshot.tower(TowerTypeId::new(4)).is_some());
        assert!(snapshot.tower(TowerTypeId::new(5)).is_none());
    }

    #[test]
    fn test_infinite_action_phase() {
        let rules = MatchRules::new().with_action_phase_time(INFINITE_TIME);
        let snapshot = RulesSnapshot::capture(&rules).unwrap();

        assert!(!snapshot.is_action_phase_timed());
        assert_eq!(snapshot.action_phase_duration(30), Countdown::Infinite);
    }

    #[test]
    fn test_earned_bonus_respects_ceiling() {
        let rules = MatchRules::new()
            .with_action_phase_time(60)
            .with_max_action_phase_time(75);
        let snapshot = RulesSnapshot::capture(&rules).unwrap();

        assert_eq!(snapshot.action_phase_duration(0), Countdown::Finite(60));
        assert_eq!(snapshot.action_phase_duration(10), Countdown::Finite(70));
        assert_eq!(snapshot.action_phase_duration(40), Countdown::Finite(75));
    }

    #[test]
    fn test_capture_rejects_invalid_rules() {
        let rules = MatchRules::new().with_tile_movements(3, 1);
        assert!(RulesSnapshot::capture(&rules).is_err());
    }

    #[test]
    fn test_spell_casts_any() {
        assert!(SpellCasts::Infinite.any());
        assert!(SpellCasts::Limited(1).any());
        assert!(!SpellCasts::Limited(0).any());
    }
}
