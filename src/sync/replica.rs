use tracing::{debug, info};

use super::{Notification, ReplicatedState, SyncMessage};
use crate::core::{PlayerId, RulesError, TileId};
use crate::flow::{MatchState, MatchWinCondition, RoundState, RoundStateListener};
use crate::ledger::HealthChangeReport;
use crate::timer::{Countdown, TimerState};

/// Something an observer should react to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MirrorEvent {
    MatchStateEntered(MatchState),
    RoundStateEntered(RoundState),
    TimerChanged {
        state: TimerState,
        remaining: Option<Countdown>,
    },
    HealthReportsUpdated,
    RulesReceived,
    WinDetails {
        winner: Option<PlayerId>,
        condition: Option<MatchWinCondition>,
    },
    FocusTile(TileId),
    Notified(Notification),
}

/// Observer-side mirror of the authority.
#[derive(Default)]
pub struct Replica {
    mirror: ReplicatedState,
    focus_tile: Option<TileId>,
    round_listeners: Vec<RoundStateListener>,
}

impl Replica {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last state received from the authority.
    #[must_use]
    pub fn state(&self) -> &ReplicatedState {
        &self.mirror
    }

    /// Register a callback for round state changes seen by this replica.
    pub fn subscribe_round_state_changed(&mut self, listener: impl FnMut(RoundState) + Send + 'static) {
        self.round_listeners.push(Box::new(listener));
    }

    /// Replace the mirror and report every field that changed.
    pub fn apply_state(&mut self, incoming: ReplicatedState) -> Vec<MirrorEvent> {
        let old = std::mem::replace(&mut self.mirror, incoming);
        let new = &self.mirror;
        let mut events = Vec::new();

        if old.match_state != new.match_state {
            info!(from = ?old.match_state, to = ?new.match_state, "replica entered match state");
            events.push(MirrorEvent::MatchStateEntered(new.match_state));
        }
        if old.round_state != new.round_state {
            if let Some(round) = new.round_state {
                debug!(?round, "replica entered round state");
                events.push(MirrorEvent::RoundStateEntered(round));
                for listener in &mut self.round_listeners {
                    listener(round);
                }
            }
        }
        if old.timer_state != new.timer_state || old.time_remaining != new.time_remaining {
            events.push(MirrorEvent::TimerChanged {
                state: new.timer_state,
                remaining: new.time_remaining,
            });
        }
        if old.health_reports != new.health_reports {
            events.push(MirrorEvent::HealthReportsUpdated);
        }
        if old.rules.is_none() && new.rules.is_some() {
            events.push(MirrorEvent::RulesReceived);
        }
        events
    }

    /// Handle a multicast from the authority.
    pub fn receive(&mut self, notification: Notification) -> Vec<MirrorEvent> {
        let mut events = Vec::new();
        if let Notification::WinDetails { winner, condition } = &notification {
            self.mirror.winner = *winner;
            self.mirror.win_condition = *condition;
            events.push(MirrorEvent::WinDetails {
                winner: *winner,
                condition: *condition,
            });
        }
        if let Some(tile) = notification.focus_tile() {
            self.focus_tile = Some(tile);
            events.push(MirrorEvent::FocusTile(tile));
        }
        events.push(MirrorEvent::Notified(notification));
        events
    }

    /// Decode and apply one wire message.
    pub fn receive_bytes(&mut self, bytes: &[u8]) -> Result<Vec<MirrorEvent>, RulesError> {
        Ok(match SyncMessage::decode(bytes)? {
            SyncMessage::State(state) => self.apply_state(state),
            SyncMessage::Multicast(notification) => self.receive(notification),
        })
    }

    #[must_use]
    pub fn match_state(&self) -> MatchState {
        self.mirror.match_state
    }

    #[must_use]
    pub fn round_state(&self) -> Option<RoundState> {
        self.mirror.round_state
    }

    #[must_use]
    pub fn is_action_phase_active(&self) -> bool {
        self.mirror.round_state.is_some_and(RoundState::is_action_phase)
    }

    /// Tile the latest confirm pointed at.
    #[must_use]
    pub fn focus_tile(&self) -> Option<TileId> {
        self.focus_tile
    }

    #[must_use]
    pub fn damage_health_reports(&self, filter_out_dead: bool) -> Vec<HealthChangeReport> {
        self.mirror.health_reports.damage(filter_out_dead)
    }

    #[must_use]
    pub fn healing_health_reports(&self) -> Vec<HealthChangeReport> {
        self.mirror.health_reports.healing()
    }

    #[must_use]
    pub fn players_damaged_health_reports(&self, player: PlayerId, filter_out_dead: bool) -> Vec<HealthChangeReport> {
        self.mirror.health_reports.players_damage(player, filter_out_dead)
    }

    #[must_use]
    pub fn players_healing_health_reports(&self, player: PlayerId) -> Vec<HealthChangeReport> {
        self.mirror.health_reports.players_healing(player)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::{EntityId, MatchRules};
    use crate::rules::RulesSnapshot;

    fn playing(round: RoundState) -> ReplicatedState {
        ReplicatedState {
            match_state: MatchState::Playing,
            round_state: Some(round),
            ..ReplicatedState::default()
        }
    }

    #[test]
    fn test_unchanged_state_reports_nothing() {
        let mut replica = Replica::new();
        assert!(replica.apply_state(ReplicatedState::default()).is_empty());
    }

    #[test]
    fn test_round_change_fires_listeners() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut replica = Replica::new();
        replica.subscribe_round_state_changed(move |round| sink.lock().unwrap().push(round));

        let events = replica.apply_state(playing(RoundState::CollectionPhase));
        assert_eq!(
            events,
            vec![
                MirrorEvent::MatchStateEntered(MatchState::Playing),
                MirrorEvent::RoundStateEntered(RoundState::CollectionPhase),
            ]
        );

        replica.apply_state(playing(RoundState::FirstActionPhase));
        assert!(replica.is_action_phase_active());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![RoundState::CollectionPhase, RoundState::FirstActionPhase]
        );
    }

    #[test]
    fn test_rules_and_health_changes() {
        let mut replica = Replica::new();
        let mut state = ReplicatedState {
            rules: Some(RulesSnapshot::capture(&MatchRules::new()).unwrap()),
            ..ReplicatedState::default()
        };
        assert_eq!(replica.apply_state(state.clone()), vec![MirrorEvent::RulesReceived]);

        state
            .health_reports
            .replace(vec![HealthChangeReport::new(EntityId::new(1), Some(PlayerId::new(0)), -3)]);
        assert_eq!(replica.apply_state(state), vec![MirrorEvent::HealthReportsUpdated]);
        assert_eq!(replica.damage_health_reports(false).len(), 1);
        assert_eq!(replica.players_damaged_health_reports(PlayerId::new(1), false).len(), 0);
    }

    #[test]
    fn test_win_details_recorded_locally() {
        let mut replica = Replica::new();
        let events = replica.receive(Notification::WinDetails {
            winner: Some(PlayerId::new(1)),
            condition: Some(MatchWinCondition::CastleDestroyed),
        });

        assert_eq!(replica.state().winner, Some(PlayerId::new(1)));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_receive_bytes_sets_focus() {
        let mut replica = Replica::new();
        let bytes = SyncMessage::Multicast(Notification::MoveRequestConfirmed {
            player: PlayerId::new(0),
            target: TileId::new(12),
            tiles: 2,
        })
        .encode()
        .unwrap();

        let events = replica.receive_bytes(&bytes).unwrap();
        assert!(events.contains(&MirrorEvent::FocusTile(TileId::new(12))));
        assert_eq!(replica.focus_tile(), Some(TileId::new(12)));
    }
}
