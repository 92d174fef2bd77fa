//! Replication between the authority and its observers.
//!
//! The authority owns the only writable `GameState`. After each step the host
//! snapshots it with `GameState::replicated_state` and drains its multicast
//! outbox; both travel as `SyncMessage`s. Observers feed them into a
//! `Replica`, which diffs incoming state against its mirror and reports what
//! changed. Replicas never run authority side effects.

mod notification;
mod replica;

pub use notification::Notification;
pub use replica::{MirrorEvent, Replica};

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, RulesError};
use crate::flow::{MatchState, MatchWinCondition, RoundState};
use crate::ledger::HealthReports;
use crate::rules::RulesSnapshot;
use crate::timer::{Countdown, TimerState};

/// Every replicated field of the authoritative state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatedState {
    pub match_state: MatchState,
    /// Only set while playing.
    pub round_state: Option<RoundState>,
    pub coin_toss_winner: Option<PlayerId>,
    pub action_phase_player: Option<PlayerId>,
    pub timer_state: TimerState,
    /// `None` when no timer is active.
    pub time_remaining: Option<Countdown>,
    pub health_reports: HealthReports,
    pub rules: Option<RulesSnapshot>,
    pub rounds_played: u32,
    pub winner: Option<PlayerId>,
    pub win_condition: Option<MatchWinCondition>,
}

/// A message on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMessage {
    State(ReplicatedState),
    Multicast(Notification),
}

impl SyncMessage {
    pub fn encode(&self) -> Result<Vec<u8>, RulesError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RulesError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
