//! Read-only questions the host and UI ask before issuing requests.
//!
//! Everything here is derived from the rules snapshot, the turn ledger and
//! the borrowed collaborators on each call.

use tracing::warn;

use super::GameState;
use crate::board::World;
use crate::core::{PlayerId, TileId, TowerArchetype, TowerTypeId};
use crate::ledger::{HealthChangeReport, SpellContext};
use crate::rules::SpellCasts;
use crate::timer::TimerReason;

impl GameState {
    // === Movement ===

    /// Whether `player` has moved at least the minimum tiles this phase.
    #[must_use]
    pub fn has_player_moved_required_tiles(&self, player: PlayerId) -> bool {
        self.rules
            .as_ref()
            .is_some_and(|r| self.ledger.counters(player).tiles_moved >= r.min_tile_movements)
    }

    /// Tiles `player` may still move this phase, never negative.
    #[must_use]
    pub fn players_num_remaining_moves(&self, player: PlayerId) -> u32 {
        self.rules.as_ref().map_or(0, |r| {
            r.max_tile_movements
                .saturating_sub(self.ledger.counters(player).tiles_moved)
        })
    }

    /// Tiles `player` could move to with the moves left.
    ///
    /// With `pathfind` set, only tiles with a walkable path short enough are
    /// kept; otherwise tile distance alone decides. `None` when the board or
    /// the player's location is unknown.
    #[must_use]
    pub fn tiles_player_can_move_to(&self, world: &World<'_>, player: PlayerId, pathfind: bool) -> Option<Vec<TileId>> {
        let Some(board) = world.board else {
            warn!(%player, "movement query without a board");
            return None;
        };
        let from = world.roster.current_tile(player)?;
        let remaining = self.players_num_remaining_moves(player);
        if remaining == 0 {
            return Some(Vec::new());
        }

        let tiles = board
            .tiles_in_range(from, remaining)
            .into_iter()
            .filter(|&tile| !board.is_occupied(tile))
            .filter(|&tile| {
                !pathfind
                    || board
                        .find_path(from, tile)
                        .is_some_and(|path| path.len() as u32 <= remaining)
            })
            .collect();
        Some(tiles)
    }

    // === Building ===

    /// Free tiles within build range of `player`'s castle.
    #[must_use]
    pub fn tiles_player_can_build_on(&self, world: &World<'_>, player: PlayerId) -> Option<Vec<TileId>> {
        let Some(board) = world.board else {
            warn!(%player, "build query without a board");
            return None;
        };
        let rules = self.rules.as_ref()?;
        let castle = world.roster.castle_tile(player)?;
        Some(
            board
                .tiles_in_range(castle, rules.max_build_range)
                .into_iter()
                .filter(|&tile| !board.is_occupied(tile))
                .collect(),
        )
    }

    /// Whether `player` has build actions left this phase.
    #[must_use]
    pub fn can_player_build_more_towers(&self, player: PlayerId) -> bool {
        self.rules
            .as_ref()
            .is_some_and(|r| self.ledger.counters(player).builds < r.max_builds_per_turn)
    }

    /// Whether `player` can afford `tower` and building it stays within every
    /// tower cap.
    #[must_use]
    pub fn can_player_build_tower(&self, world: &World<'_>, player: PlayerId, tower: TowerTypeId) -> bool {
        let Some(rules) = &self.rules else {
            return false;
        };
        let Some(archetype) = rules.tower(tower) else {
            return false;
        };
        if world.roster.gold(player) < archetype.gold_cost {
            return false;
        }

        if archetype.legendary {
            return self.towers.player_legendary_count(player) < rules.max_num_legendary_towers;
        }
        if self.towers.player_normal_count(player) >= rules.max_num_towers {
            return false;
        }
        let instances = self.towers.player_instance_count(player, tower);
        if instances >= rules.max_num_duplicated_towers {
            return false;
        }
        // A second instance turns this archetype into a duplicated type.
        instances != 1 || self.towers.player_duplicated_types(player) < rules.max_num_duplicated_tower_types
    }

    /// Archetypes `player` could build right now.
    #[must_use]
    pub fn towers_player_can_build(&self, world: &World<'_>, player: PlayerId) -> Vec<TowerTypeId> {
        if !self.can_player_build_more_towers(player) {
            return Vec::new();
        }
        self.available_towers()
            .iter()
            .map(|t| t.id)
            .filter(|&id| self.can_player_build_tower(world, player, id))
            .collect()
    }

    /// Archetypes offered this match; empty before rules are captured.
    #[must_use]
    pub fn available_towers(&self) -> &[TowerArchetype] {
        match &self.rules {
            Some(rules) => &rules.available_towers,
            None => &[],
        }
    }

    /// Live instances of `tower` across all players.
    #[must_use]
    pub fn tower_instance_count(&self, tower: TowerTypeId) -> u32 {
        self.towers.instance_count(tower)
    }

    #[must_use]
    pub fn player_tower_instance_count(&self, player: PlayerId, tower: TowerTypeId) -> u32 {
        self.towers.player_instance_count(player, tower)
    }

    // === Spells ===

    /// Normal casts `player` has left this phase.
    #[must_use]
    pub fn player_num_remaining_spell_casts(&self, player: PlayerId) -> SpellCasts {
        match self.rules.as_ref().map(|r| r.max_spell_casts) {
            Some(None) => SpellCasts::Infinite,
            Some(Some(max)) => SpellCasts::Limited(max.saturating_sub(self.ledger.counters(player).spells_cast)),
            None => SpellCasts::Limited(0),
        }
    }

    /// Whether `player` may cast a spell costing `mana_cost` (plus
    /// `additional_mana`) in `context` right now.
    #[must_use]
    pub fn can_player_cast_spell(
        &self,
        world: &World<'_>,
        player: PlayerId,
        context: SpellContext,
        mana_cost: u32,
        additional_mana: u32,
    ) -> bool {
        let Ok(active) = self.require_action_phase() else {
            return false;
        };
        let allowed = match context {
            SpellContext::Normal => {
                player == active
                    && self.ledger.pending().is_none()
                    && !self.is_selection_active()
                    && self.player_num_remaining_spell_casts(player).any()
            }
            SpellContext::QuickEffect => {
                matches!(self.timer.reason(), Some(TimerReason::QuickEffect { .. }))
                    && self.opposing_player(active) == Some(player)
            }
            SpellContext::BonusSpell => self.timer.reason() == Some(TimerReason::BonusSpell) && player == active,
        };
        allowed && world.roster.mana(player) >= mana_cost.saturating_add(additional_mana)
    }

    // === Health reports ===

    #[must_use]
    pub fn latest_action_health_reports(&self) -> &[HealthChangeReport] {
        self.health_reports.as_slice()
    }

    #[must_use]
    pub fn damage_health_reports(&self, filter_out_dead: bool) -> Vec<HealthChangeReport> {
        self.health_reports.damage(filter_out_dead)
    }

    #[must_use]
    pub fn healing_health_reports(&self) -> Vec<HealthChangeReport> {
        self.health_reports.healing()
    }

    #[must_use]
    pub fn players_damaged_health_reports(&self, player: PlayerId, filter_out_dead: bool) -> Vec<HealthChangeReport> {
        self.health_reports.players_damage(player, filter_out_dead)
    }

    #[must_use]
    pub fn players_healing_health_reports(&self, player: PlayerId) -> Vec<HealthChangeReport> {
        self.health_reports.players_healing(player)
    }
}
