//! Board events that end the match or change what stands on it.

use tracing::{info, warn};

use super::GameState;
use crate::board::World;
use crate::core::{EntityId, PlayerId, RulesError, TileId};
use crate::flow::{MatchState, MatchWinCondition};
use crate::ledger::LedgerEntry;
use crate::sync::Notification;

impl GameState {
    /// `player` stepped onto `portal`. Wins the match if it is the
    /// opponent's portal.
    pub fn handle_portal_reached(&mut self, world: &World<'_>, player: PlayerId, portal: TileId) -> Result<(), RulesError> {
        self.require_playing()?;
        let opponent = self.opposing_player(player).ok_or(RulesError::UnknownPlayer(player))?;
        if world.roster.portal_tile(opponent) != Some(portal) {
            return Err(RulesError::NotOpponentPortal(portal));
        }
        self.multicast(Notification::PortalReached { player, portal });
        self.finish_match(player, MatchWinCondition::PortalReached)
    }

    /// `player` destroyed the opponent's castle.
    pub fn handle_castle_destroyed(&mut self, player: PlayerId, castle: EntityId) -> Result<(), RulesError> {
        self.require_playing()?;
        if player.index() >= self.player_count {
            return Err(RulesError::UnknownPlayer(player));
        }
        self.multicast(Notification::CastleDestroyed { player, castle });
        self.finish_match(player, MatchWinCondition::CastleDestroyed)
    }

    /// `player` left mid match; the opponent wins.
    pub fn handle_player_left(&mut self, player: PlayerId) -> Result<(), RulesError> {
        self.require_playing()?;
        let opponent = self.opposing_player(player).ok_or(RulesError::UnknownPlayer(player))?;
        warn!(%player, "player left the match");
        self.finish_match(opponent, MatchWinCondition::OpponentLeft)
    }

    /// A tower left the board. With `by_request` set the active player
    /// destroyed one of their own towers and it counts as one of their build
    /// actions; that needs an idle action phase.
    pub fn handle_tower_destroyed(&mut self, tower: EntityId, by_request: bool) -> Result<(), RulesError> {
        self.require_playing()?;
        let existing = self.towers.get(tower).ok_or(RulesError::UnknownTower(tower))?;

        let actor = if by_request {
            let player = self.require_action_phase()?;
            self.require_idle()?;
            if existing.owner != player {
                return Err(RulesError::NotActionPhasePlayer(existing.owner));
            }
            Some(player)
        } else {
            None
        };

        let removed = self.towers.remove(tower).ok_or(RulesError::UnknownTower(tower))?;
        if let Some(player) = actor {
            if let Some(counters) = self.ledger.counters_mut(player) {
                counters.builds += 1;
            }
        }
        self.record(actor, LedgerEntry::TowerDestroyed { tower, by_request });
        self.multicast(Notification::TowerDestroyed {
            tower: removed,
            by_request,
        });
        Ok(())
    }

    #[must_use]
    pub fn match_winner(&self) -> Option<PlayerId> {
        self.match_winner
    }

    #[must_use]
    pub fn match_win_condition(&self) -> Option<MatchWinCondition> {
        self.win_condition
    }

    fn require_playing(&self) -> Result<(), RulesError> {
        if self.is_match_in_progress() {
            Ok(())
        } else {
            Err(RulesError::MatchNotInProgress)
        }
    }

    fn finish_match(&mut self, winner: PlayerId, condition: MatchWinCondition) -> Result<(), RulesError> {
        info!(%winner, ?condition, "match won");
        self.match_winner = Some(winner);
        self.win_condition = Some(condition);
        self.set_match_state(MatchState::Finished)
    }
}
