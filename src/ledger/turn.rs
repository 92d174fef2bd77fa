use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId, PlayerMap, TileId, TowerTypeId};

/// In which window a spell is being cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellContext {
    /// Regular cast by the active player, counted against the spell quota.
    Normal,
    /// Reactive cast by the opponent during a quick effect window.
    QuickEffect,
    /// Extra cast granted by a bonus spell window.
    BonusSpell,
}

/// A request that has been confirmed and is waiting for its finish.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    Move { target: TileId, tiles: u32 },
    Build { tile: TileId, tower: TowerTypeId },
    Spell { tile: TileId },
}

/// What a player has done during their current action phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCounters {
    pub tiles_moved: u32,
    pub spells_cast: u32,
    /// Builds plus towers destroyed by request.
    pub builds: u32,
}

/// A resolved action, kept for the match history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntry {
    Moved { target: TileId, tiles: u32 },
    Built { tower: EntityId, archetype: TowerTypeId },
    SpellCast { context: SpellContext, tile: TileId },
    SelectionSkipped { context: SpellContext },
    TowerDestroyed { tower: EntityId, by_request: bool },
}

/// A ledger entry with ordering metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Round the action resolved in (rounds played so far).
    pub round: u32,
    /// Position within the match.
    pub sequence: u32,
    /// Acting player, `None` for board events such as combat.
    pub player: Option<PlayerId>,
    pub entry: LedgerEntry,
}

/// Turn counters, pending requests and match history.
#[derive(Clone, Debug)]
pub struct TurnLedger {
    counters: PlayerMap<TurnCounters>,
    earned_bonus: PlayerMap<u32>,
    pending: Option<PendingAction>,
    pending_reaction: Option<(SpellContext, TileId)>,
    history: Vector<ActionRecord>,
    next_sequence: u32,
}

impl TurnLedger {
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            counters: PlayerMap::with_default(player_count),
            earned_bonus: PlayerMap::with_value(player_count, 0),
            pending: None,
            pending_reaction: None,
            history: Vector::new(),
            next_sequence: 0,
        }
    }

    /// Counters for a player; zeroed for an unseated id.
    #[must_use]
    pub fn counters(&self, player: PlayerId) -> TurnCounters {
        self.counters.get(player).copied().unwrap_or_default()
    }

    pub fn counters_mut(&mut self, player: PlayerId) -> Option<&mut TurnCounters> {
        self.counters.get_mut(player)
    }

    /// Zero a player's counters at the start of their action phase.
    pub fn begin_turn(&mut self, player: PlayerId) {
        if let Some(counters) = self.counters.get_mut(player) {
            *counters = TurnCounters::default();
        }
    }

    /// Bank bonus seconds for the player's next action phase.
    pub fn grant_bonus(&mut self, player: PlayerId, seconds: u32) {
        if let Some(bonus) = self.earned_bonus.get_mut(player) {
            *bonus = bonus.saturating_add(seconds);
        }
    }

    /// Take (and clear) the banked bonus seconds.
    pub fn take_bonus(&mut self, player: PlayerId) -> u32 {
        self.earned_bonus.get_mut(player).map_or(0, std::mem::take)
    }

    #[must_use]
    pub fn earned_bonus(&self, player: PlayerId) -> u32 {
        self.earned_bonus.get(player).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn set_pending(&mut self, action: PendingAction) {
        self.pending = Some(action);
    }

    pub fn take_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    /// Quick effect or bonus spell cast waiting for its finish.
    #[must_use]
    pub fn pending_reaction(&self) -> Option<(SpellContext, TileId)> {
        self.pending_reaction
    }

    pub fn set_pending_reaction(&mut self, context: SpellContext, tile: TileId) {
        self.pending_reaction = Some((context, tile));
    }

    pub fn take_pending_reaction(&mut self) -> Option<(SpellContext, TileId)> {
        self.pending_reaction.take()
    }

    /// Drop anything pending (match ended or aborted).
    pub fn clear_pending(&mut self) {
        self.pending = None;
        self.pending_reaction = None;
    }

    /// Append a resolved action to the history.
    pub fn record(&mut self, round: u32, player: Option<PlayerId>, entry: LedgerEntry) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.history.push_back(ActionRecord {
            round,
            sequence,
            player,
            entry,
        });
    }

    /// Every resolved action this match, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<ActionRecord> {
        &self.history
    }
}
