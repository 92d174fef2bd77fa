//! Match and round phase machine.
//!
//! - `MatchState`: WaitingForPlayers → CoinFlip → Playing → Finished →
//!   PlayersLeaving, with Aborted reachable from any non-terminal state.
//! - `RoundState`: CollectionPhase → FirstActionPhase → SecondActionPhase →
//!   EndRoundPhase → CollectionPhase, only while playing.
//!
//! Internally both are folded into one `Phase` so a round state cannot exist
//! outside of play.

mod clock;
mod states;

pub use clock::{format_match_time, MatchClock};
pub use states::{MatchState, MatchWinCondition, Phase, RoundState};

/// Callback fired after every round state change.
pub type RoundStateListener = Box<dyn FnMut(RoundState) + Send>;
