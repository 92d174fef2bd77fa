//! Request handling during an action phase.
//!
//! Every request is a confirm/finish pair. Confirm validates and records the
//! request as pending; the host then plays it out on the board and calls
//! finish, which commits the counters. Only one request can be pending at a
//! time, and the action phase countdown is paused in between.

use tracing::{debug, info, warn};

use super::GameState;
use crate::board::World;
use crate::core::{PlayerId, RulesError, TileId, TowerTypeId};
use crate::flow::{Phase, RoundState};
use crate::ledger::{BuiltTower, HealthChangeReport, LedgerEntry, PendingAction, SpellContext};
use crate::rules::RulesSnapshot;
use crate::sync::Notification;
use crate::timer::{Countdown, TimerReason};

impl GameState {
    /// Player whose action phase is running.
    pub(super) fn require_action_phase(&self) -> Result<PlayerId, RulesError> {
        match self.phase {
            Phase::Playing(round) if round.is_action_phase() => {
                self.action_phase_player.ok_or(RulesError::NotActionPhase)
            }
            Phase::Playing(_) => Err(RulesError::NotActionPhase),
            _ => Err(RulesError::MatchNotInProgress),
        }
    }

    pub(super) fn require_idle(&self) -> Result<(), RulesError> {
        if self.ledger.pending().is_some() || self.ledger.pending_reaction().is_some() {
            return Err(RulesError::ActionInProgress);
        }
        if self.is_selection_active() {
            return Err(RulesError::SelectionInProgress);
        }
        Ok(())
    }

    /// A quick effect or bonus spell window is open.
    #[must_use]
    pub fn is_selection_active(&self) -> bool {
        matches!(
            self.timer.reason(),
            Some(TimerReason::QuickEffect { .. } | TimerReason::BonusSpell)
        )
    }

    /// Open a new action: old health reports no longer apply and the action
    /// phase countdown holds until the action finishes.
    fn begin_action(&mut self) {
        self.health_reports.clear();
        if self.timer.reason() == Some(TimerReason::ActionPhase) {
            self.timer.set_paused(true);
        }
    }

    fn end_action(&mut self) {
        if self.timer.reason() == Some(TimerReason::ActionPhase) {
            self.timer.set_paused(false);
        }
    }

    // === Moves ===

    /// Validate a move to `target` and mark it pending. Returns the number of
    /// tiles the move will cover.
    pub fn handle_move_request_confirmed(&mut self, world: &World<'_>, target: TileId) -> Result<u32, RulesError> {
        let player = self.require_action_phase()?;
        self.require_idle()?;
        let Some(board) = world.board else {
            warn!(%player, "move requested before the board exists");
            return Err(RulesError::MissingBoard);
        };
        let from = world.roster.current_tile(player).ok_or(RulesError::MissingPlayerTile(player))?;
        let path = board.find_path(from, target).ok_or(RulesError::TileUnreachable(target))?;
        if path.is_empty() {
            return Err(RulesError::TileUnreachable(target));
        }

        let tiles = path.len() as u32;
        let remaining = self.players_num_remaining_moves(player);
        if tiles > remaining {
            return Err(RulesError::ExceedsMoveQuota {
                requested: tiles,
                remaining,
            });
        }

        self.ledger.set_pending(PendingAction::Move { target, tiles });
        self.begin_action();
        debug!(%player, %target, tiles, "move confirmed");
        self.multicast(Notification::MoveRequestConfirmed { player, target, tiles });
        Ok(tiles)
    }

    /// Commit the pending move.
    pub fn handle_move_request_finished(&mut self) -> Result<(), RulesError> {
        let player = self.require_action_phase()?;
        let Some(PendingAction::Move { target, tiles }) = self.ledger.pending() else {
            return Err(self.pending_error());
        };
        self.ledger.take_pending();
        if let Some(counters) = self.ledger.counters_mut(player) {
            counters.tiles_moved += tiles;
        }
        self.record(Some(player), LedgerEntry::Moved { target, tiles });
        self.end_action();
        self.multicast(Notification::MoveRequestFinished { player });
        Ok(())
    }

    // === Builds ===

    /// Validate building `tower` on `tile` and mark it pending.
    pub fn handle_build_request_confirmed(
        &mut self,
        world: &World<'_>,
        tile: TileId,
        tower: TowerTypeId,
    ) -> Result<(), RulesError> {
        let player = self.require_action_phase()?;
        self.require_idle()?;
        if world.board.is_none() {
            warn!(%player, "build requested before the board exists");
            return Err(RulesError::MissingBoard);
        }
        if !self.can_player_build_more_towers(player) || !self.can_player_build_tower(world, player, tower) {
            return Err(RulesError::CannotBuildTower(tower));
        }
        let buildable = self.tiles_player_can_build_on(world, player).unwrap_or_default();
        if !buildable.contains(&tile) {
            return Err(RulesError::TileNotBuildable(tile));
        }

        self.ledger.set_pending(PendingAction::Build { tile, tower });
        self.begin_action();
        debug!(%player, %tile, %tower, "build confirmed");
        self.multicast(Notification::BuildRequestConfirmed { player, tile, tower });
        Ok(())
    }

    /// Commit the pending build once the host has spawned `tower`.
    pub fn handle_build_request_finished(&mut self, tower: BuiltTower) -> Result<(), RulesError> {
        let player = self.require_action_phase()?;
        let Some(PendingAction::Build { tower: archetype, .. }) = self.ledger.pending() else {
            return Err(self.pending_error());
        };
        if archetype != tower.archetype || tower.owner != player {
            return Err(RulesError::PendingActionMismatch);
        }
        if self.towers.get(tower.entity).is_some() {
            warn!(entity = %tower.entity, "built tower was already registered");
            return Err(RulesError::TowerAlreadyRegistered(tower.entity));
        }
        self.ledger.take_pending();

        let legendary = self.rules.as_ref().and_then(|r| r.tower(archetype)).is_some_and(|t| t.legendary);
        self.towers.add(tower, legendary);
        if let Some(counters) = self.ledger.counters_mut(player) {
            counters.builds += 1;
        }
        self.record(
            Some(player),
            LedgerEntry::Built {
                tower: tower.entity,
                archetype,
            },
        );
        self.end_action();
        self.multicast(Notification::BuildRequestFinished { tower });
        Ok(())
    }

    // === Spells ===

    /// Validate a spell cast in `context` targeting `tile`.
    ///
    /// Normal casts are made by the active player and count against the
    /// spell quota. Quick effect and bonus spell casts answer an open
    /// selection window, which closes on confirm.
    pub fn handle_spell_request_confirmed(&mut self, context: SpellContext, tile: TileId) -> Result<(), RulesError> {
        let player = self.require_action_phase()?;
        match context {
            SpellContext::Normal => {
                self.require_idle()?;
                if !self.player_num_remaining_spell_casts(player).any() {
                    return Err(RulesError::NoSpellCastsRemaining);
                }
                self.ledger.set_pending(PendingAction::Spell { tile });
                self.begin_action();
            }
            SpellContext::QuickEffect | SpellContext::BonusSpell => {
                if self.selection_context() != Some(context) {
                    return Err(RulesError::NoSelectionActive);
                }
                if self.ledger.pending_reaction().is_some() {
                    return Err(RulesError::ActionInProgress);
                }
                self.timer.deactivate();
                self.ledger.set_pending_reaction(context, tile);
                self.health_reports.clear();
            }
        }
        debug!(?context, %tile, "spell confirmed");
        self.multicast(Notification::SpellRequestConfirmed { context, tile });
        Ok(())
    }

    /// Commit the pending cast for `context`.
    pub fn handle_spell_request_finished(&mut self, context: SpellContext) -> Result<(), RulesError> {
        let player = self.require_action_phase()?;
        match context {
            SpellContext::Normal => {
                let Some(PendingAction::Spell { tile }) = self.ledger.pending() else {
                    return Err(self.pending_error());
                };
                self.ledger.take_pending();
                if let Some(counters) = self.ledger.counters_mut(player) {
                    counters.spells_cast += 1;
                }
                self.record(Some(player), LedgerEntry::SpellCast { context, tile });
                self.end_action();
            }
            SpellContext::QuickEffect | SpellContext::BonusSpell => {
                let Some((pending, tile)) = self.ledger.pending_reaction() else {
                    return Err(RulesError::NoPendingAction);
                };
                if pending != context {
                    return Err(RulesError::PendingActionMismatch);
                }
                self.ledger.take_pending_reaction();
                let caster = match context {
                    SpellContext::QuickEffect => self.opposing_player(player),
                    _ => Some(player),
                };
                self.record(caster, LedgerEntry::SpellCast { context, tile });
                self.resume_action_phase_timer();
            }
        }
        self.multicast(Notification::SpellRequestFinished { context });
        Ok(())
    }

    fn pending_error(&self) -> RulesError {
        if self.ledger.pending().is_some() {
            RulesError::PendingActionMismatch
        } else {
            RulesError::NoPendingAction
        }
    }

    // === Selection windows ===

    /// Open the quick effect window for the opponent of the active player.
    pub fn handle_quick_effect_selection_start(&mut self, nullify: bool) -> Result<(), RulesError> {
        let window = self.open_selection_window()?.quick_effect_selection_time;
        self.interrupt_action_phase();
        self.activate_tick_timer(TimerReason::QuickEffect { nullify }, Countdown::Finite(window));
        info!(nullify, window, "quick effect selection started");
        self.multicast(Notification::QuickEffectSelection { nullify });
        Ok(())
    }

    /// Open a bonus spell window for the active player.
    pub fn handle_bonus_spell_selection_start(&mut self) -> Result<(), RulesError> {
        let window = self.open_selection_window()?.bonus_spell_selection_time;
        self.interrupt_action_phase();
        self.activate_tick_timer(TimerReason::BonusSpell, Countdown::Finite(window));
        info!(window, "bonus spell selection started");
        self.multicast(Notification::BonusSpellSelection);
        Ok(())
    }

    /// Close the open selection window without a cast.
    pub fn handle_selection_skipped(&mut self) -> Result<(), RulesError> {
        let context = self.selection_context().ok_or(RulesError::NoSelectionActive)?;
        self.timer.deactivate();
        self.resolve_selection_skipped(context);
        Ok(())
    }

    fn open_selection_window(&self) -> Result<&RulesSnapshot, RulesError> {
        self.require_action_phase()?;
        if self.is_selection_active() || self.ledger.pending_reaction().is_some() {
            return Err(RulesError::SelectionInProgress);
        }
        self.rules_ref()
    }

    fn selection_context(&self) -> Option<SpellContext> {
        match self.timer.reason()? {
            TimerReason::QuickEffect { .. } => Some(SpellContext::QuickEffect),
            TimerReason::BonusSpell => Some(SpellContext::BonusSpell),
            _ => None,
        }
    }

    /// Save the running action phase time before a selection window takes
    /// over the timer.
    fn interrupt_action_phase(&mut self) {
        if self.timer.reason() == Some(TimerReason::ActionPhase) {
            self.interrupted_action_time = self.timer.remaining();
        }
    }

    pub(super) fn resolve_selection_skipped(&mut self, context: SpellContext) {
        debug!(?context, "selection skipped");
        self.record(None, LedgerEntry::SelectionSkipped { context });
        self.multicast(Notification::SelectionSkipped { context });
        self.resume_action_phase_timer();
    }

    /// Restart the interrupted action phase with bonus time added.
    fn resume_action_phase_timer(&mut self) {
        let Some(saved) = self.interrupted_action_time.take() else {
            return;
        };
        let Some(rules) = &self.rules else {
            return;
        };
        let duration = rules.time_with_bonus(saved, rules.action_time_bonus);
        debug!(?saved, ?duration, "action phase resumed");
        self.activate_tick_timer(TimerReason::ActionPhase, duration);
        if self.ledger.pending().is_some() {
            self.timer.set_paused(true);
        }
    }

    // === Turn end and bonus time ===

    /// End `player`'s action phase early. The required tiles must have been
    /// moved and nothing may be pending.
    pub fn request_end_action_phase(&mut self, player: PlayerId) -> Result<(), RulesError> {
        let current = self.require_action_phase()?;
        if player != current {
            return Err(RulesError::NotActionPhasePlayer(player));
        }
        self.require_idle()?;
        if !self.has_player_moved_required_tiles(player) {
            return Err(RulesError::RequiredTilesNotMoved);
        }
        let next = match self.round_state() {
            Some(RoundState::FirstActionPhase) => RoundState::SecondActionPhase,
            _ => RoundState::EndRoundPhase,
        };
        self.set_round_state(next)
    }

    /// Bank bonus seconds for `player`'s next action phase.
    pub fn grant_action_time_bonus(&mut self, player: PlayerId, seconds: u32) -> Result<(), RulesError> {
        self.require_not_over()?;
        if player.index() >= self.player_count {
            return Err(RulesError::UnknownPlayer(player));
        }
        self.ledger.grant_bonus(player, seconds);
        debug!(%player, seconds, "action time bonus granted");
        Ok(())
    }

    // === Health reports ===

    /// Replace the health reports with those of the action that just resolved.
    pub fn set_latest_action_health_reports(&mut self, reports: Vec<HealthChangeReport>) -> Result<(), RulesError> {
        self.require_not_over()?;
        self.health_reports.replace(reports);
        Ok(())
    }
}
