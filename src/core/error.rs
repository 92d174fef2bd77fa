//! Rule violations reported by authority commands.
//!
//! Commands fail by returning one of these instead of panicking. Callers are
//! expected to have asked the matching `can_*` query first; there is no
//! automatic retry.

use thiserror::Error;

use super::{EntityId, PlayerId, TileId, TowerTypeId};
use crate::flow::{MatchState, RoundState};
use crate::timer::TimerState;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("cannot activate a timer for state {0:?}")]
    InvalidTimerState(TimerState),

    #[error("timer is busy counting down {0:?}")]
    TimerBusy(TimerState),

    #[error("invalid match transition {from:?} -> {to:?}")]
    InvalidMatchTransition { from: MatchState, to: MatchState },

    #[error("invalid round transition {from:?} -> {to:?}")]
    InvalidRoundTransition { from: Option<RoundState>, to: RoundState },

    #[error("no coin flip is in progress")]
    CoinFlipNotActive,

    #[error("match cannot start: {0}")]
    CannotStartMatch(&'static str),

    #[error("rules have already been captured for this match")]
    RulesAlreadyFrozen,

    #[error("rules have not been captured yet")]
    RulesNotSet,

    #[error("invalid rules: {0}")]
    InvalidRules(String),

    #[error("match is not in progress")]
    MatchNotInProgress,

    #[error("no action phase is active")]
    NotActionPhase,

    #[error("{0} is not the player seated in this match")]
    UnknownPlayer(PlayerId),

    #[error("it is not {0}'s action phase")]
    NotActionPhasePlayer(PlayerId),

    #[error("another action is still resolving")]
    ActionInProgress,

    #[error("no action is pending")]
    NoPendingAction,

    #[error("pending action does not match the finished request")]
    PendingActionMismatch,

    #[error("no board is set for this match")]
    MissingBoard,

    #[error("{0} has no known location on the board")]
    MissingPlayerTile(PlayerId),

    #[error("{0} cannot be reached")]
    TileUnreachable(TileId),

    #[error("move of {requested} tiles exceeds the {remaining} remaining")]
    ExceedsMoveQuota { requested: u32, remaining: u32 },

    #[error("{0} cannot be built")]
    CannotBuildTower(TowerTypeId),

    #[error("{0} is not a buildable tile")]
    TileNotBuildable(TileId),

    #[error("no spell casts remaining this action phase")]
    NoSpellCastsRemaining,

    #[error("a selection window is already open")]
    SelectionInProgress,

    #[error("no selection window is open")]
    NoSelectionActive,

    #[error("player has not moved the required tiles")]
    RequiredTilesNotMoved,

    #[error("{0} is not the opponent's portal")]
    NotOpponentPortal(TileId),

    #[error("{0} is not a live tower")]
    UnknownTower(EntityId),

    #[error("{0} is already a live tower")]
    TowerAlreadyRegistered(EntityId),

    #[error("sync codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
