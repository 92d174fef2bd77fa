use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId, TileId, TowerTypeId};
use crate::flow::MatchWinCondition;
use crate::ledger::{BuiltTower, SpellContext};

/// One-shot events the authority multicasts to every participant.
///
/// Emitted in order; a request's confirm always precedes its finish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    WinDetails {
        winner: Option<PlayerId>,
        condition: Option<MatchWinCondition>,
    },
    MoveRequestConfirmed {
        player: PlayerId,
        target: TileId,
        tiles: u32,
    },
    MoveRequestFinished {
        player: PlayerId,
    },
    BuildRequestConfirmed {
        player: PlayerId,
        tile: TileId,
        tower: TowerTypeId,
    },
    BuildRequestFinished {
        tower: BuiltTower,
    },
    SpellRequestConfirmed {
        context: SpellContext,
        tile: TileId,
    },
    SpellRequestFinished {
        context: SpellContext,
    },
    QuickEffectSelection {
        nullify: bool,
    },
    BonusSpellSelection,
    SelectionSkipped {
        context: SpellContext,
    },
    PortalReached {
        player: PlayerId,
        portal: TileId,
    },
    CastleDestroyed {
        player: PlayerId,
        castle: EntityId,
    },
    TowerDestroyed {
        tower: BuiltTower,
        by_request: bool,
    },
    MatchAborted {
        reason: String,
    },
}

impl Notification {
    /// Tile observers should focus on, if the event points at one.
    #[must_use]
    pub fn focus_tile(&self) -> Option<TileId> {
        match self {
            Self::MoveRequestConfirmed { target, .. } => Some(*target),
            Self::BuildRequestConfirmed { tile, .. } | Self::SpellRequestConfirmed { tile, .. } => Some(*tile),
            Self::PortalReached { portal, .. } => Some(*portal),
            _ => None,
        }
    }
}
