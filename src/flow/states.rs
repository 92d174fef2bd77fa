use serde::{Deserialize, Serialize};

/// State of the match. Replicated to every observer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    #[default]
    WaitingForPlayers,
    CoinFlip,
    Playing,
    Finished,
    PlayersLeaving,
    Aborted,
}

impl MatchState {
    /// No transition leaves a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::PlayersLeaving | Self::Aborted)
    }

    /// The match is over; no further rule mutation is accepted.
    #[must_use]
    pub fn is_over(self) -> bool {
        matches!(self, Self::Finished | Self::PlayersLeaving | Self::Aborted)
    }

    /// Whether `next` directly follows `self`.
    ///
    /// ```
    /// use tower_conquest::flow::MatchState;
    ///
    /// assert!(MatchState::CoinFlip.can_transition_to(MatchState::Playing));
    /// assert!(MatchState::Playing.can_transition_to(MatchState::Aborted));
    /// assert!(!MatchState::WaitingForPlayers.can_transition_to(MatchState::Playing));
    /// ```
    #[must_use]
    pub fn can_transition_to(self, next: MatchState) -> bool {
        use MatchState::*;
        match (self, next) {
            (from, Aborted) => !from.is_terminal(),
            (WaitingForPlayers, CoinFlip)
            | (CoinFlip, Playing)
            | (Playing, Finished)
            | (Finished, PlayersLeaving) => true,
            _ => false,
        }
    }
}

/// Phase of the current round. Only meaningful while playing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundState {
    #[default]
    CollectionPhase,
    FirstActionPhase,
    SecondActionPhase,
    EndRoundPhase,
}

impl RoundState {
    /// The phase that follows this one.
    #[must_use]
    pub fn next(self) -> RoundState {
        match self {
            Self::CollectionPhase => Self::FirstActionPhase,
            Self::FirstActionPhase => Self::SecondActionPhase,
            Self::SecondActionPhase => Self::EndRoundPhase,
            Self::EndRoundPhase => Self::CollectionPhase,
        }
    }

    #[must_use]
    pub fn is_action_phase(self) -> bool {
        matches!(self, Self::FirstActionPhase | Self::SecondActionPhase)
    }
}

/// How the winner won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchWinCondition {
    /// Reached the opponent's portal.
    PortalReached,
    /// Destroyed the opponent's castle.
    CastleDestroyed,
    /// The opponent left mid match.
    OpponentLeft,
}

/// Match state and, while playing, the round state, as one value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    WaitingForPlayers,
    CoinFlip,
    Playing(RoundState),
    Finished,
    PlayersLeaving,
    Aborted,
}

impl Phase {
    #[must_use]
    pub fn match_state(self) -> MatchState {
        match self {
            Self::WaitingForPlayers => MatchState::WaitingForPlayers,
            Self::CoinFlip => MatchState::CoinFlip,
            Self::Playing(_) => MatchState::Playing,
            Self::Finished => MatchState::Finished,
            Self::PlayersLeaving => MatchState::PlayersLeaving,
            Self::Aborted => MatchState::Aborted,
        }
    }

    #[must_use]
    pub fn round_state(self) -> Option<RoundState> {
        match self {
            Self::Playing(round) => Some(round),
            _ => None,
        }
    }

    /// Phase entered for a match state. Play always opens on collection.
    #[must_use]
    pub fn entering(state: MatchState) -> Phase {
        match state {
            MatchState::WaitingForPlayers => Self::WaitingForPlayers,
            MatchState::CoinFlip => Self::CoinFlip,
            MatchState::Playing => Self::Playing(RoundState::CollectionPhase),
            MatchState::Finished => Self::Finished,
            MatchState::PlayersLeaving => Self::PlayersLeaving,
            MatchState::Aborted => Self::Aborted,
        }
    }
}
