//! Match rule configuration.
//!
//! `MatchRules` is what the match director is configured with before a match
//! starts. The game state never reads it directly during play: it captures a
//! `RulesSnapshot` once at match setup (see `GameState::update_rules`).
//!
//! Rules are built with the usual consuming builder or loaded from JSON:
//!
//! ```
//! use tower_conquest::core::{MatchRules, TowerArchetype, TowerTypeId};
//!
//! let rules = MatchRules::new()
//!     .with_action_phase_time(45)
//!     .with_tile_movements(1, 3)
//!     .with_tower(TowerArchetype::new(TowerTypeId::new(0), "Archer", 10));
//!
//! assert!(rules.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use super::{RulesError, TowerTypeId};

/// `action_phase_time` value that disables the action phase countdown.
pub const INFINITE_TIME: i32 = -1;

/// A tower that may be built during the match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerArchetype {
    /// Unique identifier.
    pub id: TowerTypeId,

    /// Display name (for logs).
    pub name: String,

    /// Legendary towers are capped separately from normal towers.
    pub legendary: bool,

    /// Gold needed to build one.
    pub gold_cost: u32,
}

impl TowerArchetype {
    /// Create a normal tower archetype.
    pub fn new(id: TowerTypeId, name: impl Into<String>, gold_cost: u32) -> Self {
        Self {
            id,
            name: name.into(),
            legendary: false,
            gold_cost,
        }
    }

    /// Mark as legendary.
    #[must_use]
    pub fn legendary(mut self) -> Self {
        self.legendary = true;
        self
    }
}

/// Configured gameplay limits for a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Seconds per action phase, `INFINITE_TIME` for untimed phases.
    pub action_phase_time: i32,

    /// Ceiling for action phase time once bonus time is added.
    /// `None` uses `action_phase_time`.
    pub max_action_phase_time: Option<u32>,

    /// Seconds given back to the action phase after a quick effect or
    /// bonus spell selection interrupted it.
    pub action_time_bonus: u32,

    /// Seconds the opponent has to pick a quick effect.
    pub quick_effect_selection_time: u32,

    /// Seconds to pick a bonus spell.
    pub bonus_spell_selection_time: u32,

    /// Tiles a player must move each action phase before ending it.
    pub min_tile_movements: u32,

    /// Tiles a player may move each action phase.
    pub max_tile_movements: u32,

    /// Normal spell casts per action phase, `None` for unlimited.
    pub max_spell_casts: Option<u32>,

    /// Builds (or requested destroys) per action phase.
    pub max_builds_per_turn: u32,

    /// Normal towers a player may have at once.
    pub max_num_towers: u32,

    /// Instances of one normal archetype a player may have at once.
    pub max_num_duplicated_towers: u32,

    /// Normal archetypes a player may have duplicated at once.
    pub max_num_duplicated_tower_types: u32,

    /// Legendary towers a player may have at once.
    pub max_num_legendary_towers: u32,

    /// Max tile distance from the player's castle to build on.
    pub max_build_range: u32,

    /// Archetypes that may be built this match.
    pub available_towers: Vec<TowerArchetype>,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            action_phase_time: 60,
            max_action_phase_time: None,
            action_time_bonus: 10,
            quick_effect_selection_time: 10,
            bonus_spell_selection_time: 15,
            min_tile_movements: 1,
            max_tile_movements: 3,
            max_spell_casts: Some(1),
            max_builds_per_turn: 1,
            max_num_towers: 7,
            max_num_duplicated_towers: 2,
            max_num_duplicated_tower_types: 2,
            max_num_legendary_towers: 1,
            max_build_range: 3,
            available_towers: Vec::new(),
        }
    }
}

impl MatchRules {
    /// Default rules with no towers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Set the action phase duration (`INFINITE_TIME` for untimed).
    #[must_use]
    pub fn with_action_phase_time(mut self, seconds: i32) -> Self {
        self.action_phase_time = seconds;
        self
    }

    /// Set the ceiling bonus time may raise the action phase to.
    #[must_use]
    pub fn with_max_action_phase_time(mut self, seconds: u32) -> Self {
        self.max_action_phase_time = Some(seconds);
        self
    }

    /// Set the time given back after an interrupting selection.
    #[must_use]
    pub fn with_action_time_bonus(mut self, seconds: u32) -> Self {
        self.action_time_bonus = seconds;
        self
    }

    /// Set both selection windows.
    #[must_use]
    pub fn with_selection_times(mut self, quick_effect: u32, bonus_spell: u32) -> Self {
        self.quick_effect_selection_time = quick_effect;
        self.bonus_spell_selection_time = bonus_spell;
        self
    }

    /// Set the min/max tiles moved per action phase.
    #[must_use]
    pub fn with_tile_movements(mut self, min: u32, max: u32) -> Self {
        self.min_tile_movements = min;
        self.max_tile_movements = max;
        self
    }

    /// Set normal spell casts per action phase (`None` for unlimited).
    #[must_use]
    pub fn with_max_spell_casts(mut self, casts: Option<u32>) -> Self {
        self.max_spell_casts = casts;
        self
    }

    /// Set builds per action phase.
    #[must_use]
    pub fn with_max_builds_per_turn(mut self, builds: u32) -> Self {
        self.max_builds_per_turn = builds;
        self
    }

    /// Set the tower caps: total normal, per archetype, duplicated archetypes, legendary.
    #[must_use]
    pub fn with_tower_caps(mut self, total: u32, duplicates: u32, duplicated_types: u32, legendary: u32) -> Self {
        self.max_num_towers = total;
        self.max_num_duplicated_towers = duplicates;
        self.max_num_duplicated_tower_types = duplicated_types;
        self.max_num_legendary_towers = legendary;
        self
    }

    /// Set the build range from the castle.
    #[must_use]
    pub fn with_max_build_range(mut self, range: u32) -> Self {
        self.max_build_range = range;
        self
    }

    /// Add a buildable tower archetype.
    #[must_use]
    pub fn with_tower(mut self, tower: TowerArchetype) -> Self {
        self.available_towers.push(tower);
        self
    }

    /// Check the rules are internally consistent.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.action_phase_time < INFINITE_TIME {
            return Err(RulesError::InvalidRules(format!(
                "action phase time {} is below {}",
                self.action_phase_time, INFINITE_TIME
            )));
        }
        if self.min_tile_movements > self.max_tile_movements {
            return Err(RulesError::InvalidRules(format!(
                "min tile movements {} exceeds max {}",
                self.min_tile_movements, self.max_tile_movements
            )));
        }
        if self.quick_effect_selection_time == 0 || self.bonus_spell_selection_time == 0 {
            return Err(RulesError::InvalidRules("selection windows must be positive".into()));
        }
        for (i, tower) in self.available_towers.iter().enumerate() {
            if self.available_towers[..i].iter().any(|t| t.id == tower.id) {
                return Err(RulesError::InvalidRules(format!("duplicate tower archetype {}", tower.id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let rules = MatchRules::new()
            .with_action_phase_time(INFINITE_TIME)
            .with_tile_movements(2, 4)
            .with_max_spell_casts(None)
            .with_tower(TowerArchetype::new(TowerTypeId::new(1), "Golem", 30).legendary());

        assert_eq!(rules.action_phase_time, -1);
        assert_eq!(rules.min_tile_movements, 2);
        assert_eq!(rules.max_tile_movements, 4);
        assert_eq!(rules.max_spell_casts, None);
        assert!(rules.available_towers[0].legendary);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_moves() {
        let rules = MatchRules::new().with_tile_movements(4, 2);
        assert!(matches!(rules.validate(), Err(RulesError::InvalidRules(_))));
    }

    #[test]
    fn test_validate_rejects_bad_time() {
        let rules = MatchRules::new().with_action_phase_time(-5);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_archetypes() {
        let rules = MatchRules::new()
            .with_tower(TowerArchetype::new(TowerTypeId::new(1), "A", 1))
            .with_tower(TowerArchetype::new(TowerTypeId::new(1), "B", 1));
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let rules = MatchRules::from_json(r#"{"action_phase_time": 30, "max_tile_movements": 5}"#).unwrap();

        assert_eq!(rules.action_phase_time, 30);
        assert_eq!(rules.max_tile_movements, 5);
        assert_eq!(rules.min_tile_movements, 1);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(MatchRules::from_json("{not json"), Err(RulesError::Config(_))));
    }
}
