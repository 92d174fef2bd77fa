//! The authoritative match state.
//!
//! `GameState` is the single writer for a match. The host drives it with
//! commands (request confirms and finishes, phase changes, timer control) and
//! a periodic `advance`; each command validates against the current phase,
//! the rules snapshot and the turn ledger before changing anything. Observers
//! learn about changes through `replicated_state` snapshots and the
//! notifications drained from the outbox.
//!
//! Entering a match or round state runs that state's notify hook exactly once
//! per transition. Hooks never run on replicas.

mod actions;
mod ending;
mod queries;

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::core::{GameRng, MatchRules, PlayerId, RulesError};
use crate::flow::{MatchClock, MatchState, MatchWinCondition, Phase, RoundState, RoundStateListener};
use crate::ledger::{ActionRecord, HealthReports, LedgerEntry, SpellContext, TowerInstanceTable, TurnLedger};
use crate::rules::RulesSnapshot;
use crate::sync::{Notification, ReplicatedState};
use crate::timer::{Countdown, CountdownTimer, TickOutcome, TimerReason, TimerState};

/// Callback run when a custom timer ends. The flag is true when the timer was
/// cancelled or replaced rather than running out.
pub type CustomTimerFinished = Box<dyn FnOnce(bool) + Send>;

/// Server-side state of one match.
pub struct GameState {
    player_count: usize,
    phase: Phase,
    rules: Option<RulesSnapshot>,

    timer: CountdownTimer,
    /// Action phase time saved while a selection window interrupts it.
    interrupted_action_time: Option<Countdown>,
    custom_timer_finished: Option<CustomTimerFinished>,

    coin_toss_winner: Option<PlayerId>,
    action_phase_player: Option<PlayerId>,
    match_winner: Option<PlayerId>,
    win_condition: Option<MatchWinCondition>,
    rounds_played: u32,

    ledger: TurnLedger,
    towers: TowerInstanceTable,
    health_reports: HealthReports,

    clock: MatchClock,
    rng: GameRng,
    round_listeners: Vec<RoundStateListener>,
    outbox: SmallVec<[Notification; 4]>,
}

impl GameState {
    /// Create a match waiting for players.
    ///
    /// # Panics
    ///
    /// Panics if `player_count` is zero or above 255.
    #[must_use]
    pub fn new(player_count: usize, seed: u64) -> Self {
        Self {
            player_count,
            phase: Phase::WaitingForPlayers,
            rules: None,
            timer: CountdownTimer::new(),
            interrupted_action_time: None,
            custom_timer_finished: None,
            coin_toss_winner: None,
            action_phase_player: None,
            match_winner: None,
            win_condition: None,
            rounds_played: 0,
            ledger: TurnLedger::new(player_count),
            towers: TowerInstanceTable::new(),
            health_reports: HealthReports::new(),
            clock: MatchClock::new(),
            rng: GameRng::new(seed),
            round_listeners: Vec::new(),
            outbox: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    // === Rules ===

    /// Capture the match rules. Rules are frozen after the first capture.
    pub fn update_rules(&mut self, rules: &MatchRules) -> Result<(), RulesError> {
        if self.rules.is_some() {
            return Err(RulesError::RulesAlreadyFrozen);
        }
        let snapshot = RulesSnapshot::capture(rules)?;
        info!(
            action_phase_time = ?snapshot.action_phase_time,
            towers = snapshot.available_towers.len(),
            "rules captured"
        );
        self.rules = Some(snapshot);
        Ok(())
    }

    #[must_use]
    pub fn rules(&self) -> Option<&RulesSnapshot> {
        self.rules.as_ref()
    }

    fn rules_ref(&self) -> Result<&RulesSnapshot, RulesError> {
        self.rules.as_ref().ok_or(RulesError::RulesNotSet)
    }

    // === Match state ===

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn match_state(&self) -> MatchState {
        self.phase.match_state()
    }

    /// Round state, `None` outside of play.
    #[must_use]
    pub fn round_state(&self) -> Option<RoundState> {
        self.phase.round_state()
    }

    #[must_use]
    pub fn is_match_in_progress(&self) -> bool {
        matches!(self.phase, Phase::Playing(_))
    }

    #[must_use]
    pub fn is_action_phase_active(&self) -> bool {
        self.round_state().is_some_and(RoundState::is_action_phase)
    }

    #[must_use]
    pub fn is_end_round_phase_active(&self) -> bool {
        self.round_state() == Some(RoundState::EndRoundPhase)
    }

    /// Move the match to `next` and run its notify hook.
    ///
    /// Entering Playing without rules or a coin toss winner aborts the match
    /// and returns `CannotStartMatch`.
    pub fn set_match_state(&mut self, next: MatchState) -> Result<(), RulesError> {
        let current = self.match_state();
        if !current.can_transition_to(next) {
            return Err(RulesError::InvalidMatchTransition { from: current, to: next });
        }
        info!(from = ?current, to = ?next, "match state changed");
        self.phase = Phase::entering(next);

        match next {
            MatchState::WaitingForPlayers | MatchState::PlayersLeaving => Ok(()),
            MatchState::CoinFlip => {
                self.notify_coin_flip_start();
                Ok(())
            }
            MatchState::Playing => self.notify_match_start(),
            MatchState::Finished => {
                self.notify_match_finished();
                Ok(())
            }
            MatchState::Aborted => {
                self.notify_match_aborted("aborted by host");
                Ok(())
            }
        }
    }

    /// Abort the match from any non-terminal state.
    pub fn abort_match(&mut self, reason: &str) -> Result<(), RulesError> {
        let current = self.match_state();
        if !current.can_transition_to(MatchState::Aborted) {
            return Err(RulesError::InvalidMatchTransition {
                from: current,
                to: MatchState::Aborted,
            });
        }
        self.abort(reason);
        Ok(())
    }

    fn abort(&mut self, reason: &str) {
        warn!(from = ?self.match_state(), reason, "match aborted");
        self.phase = Phase::Aborted;
        self.notify_match_aborted(reason);
    }

    fn notify_coin_flip_start(&mut self) {
        self.clock.mark_start();
    }

    fn notify_match_start(&mut self) -> Result<(), RulesError> {
        if self.rules.is_none() {
            self.abort("rules were never captured");
            return Err(RulesError::CannotStartMatch("rules were never captured"));
        }
        if self.coin_toss_winner.is_none() {
            self.abort("coin toss was never resolved");
            return Err(RulesError::CannotStartMatch("coin toss was never resolved"));
        }
        self.rounds_played = 0;
        self.handle_round_state_change(None, RoundState::CollectionPhase);
        Ok(())
    }

    fn notify_match_finished(&mut self) {
        self.clock.mark_end();
        self.end_play();
        info!(winner = ?self.match_winner, condition = ?self.win_condition, "match finished");
        self.multicast(Notification::WinDetails {
            winner: self.match_winner,
            condition: self.win_condition,
        });
    }

    fn notify_match_aborted(&mut self, reason: &str) {
        self.clock.mark_end();
        self.end_play();
        self.multicast(Notification::MatchAborted {
            reason: reason.to_string(),
        });
    }

    fn end_play(&mut self) {
        self.deactivate_tick_timer();
        self.ledger.clear_pending();
        self.interrupted_action_time = None;
        self.action_phase_player = None;
    }

    // === Coin flip ===

    /// Flip the seeded coin and record the winner.
    pub fn flip_coin(&mut self) -> Result<PlayerId, RulesError> {
        if self.phase != Phase::CoinFlip {
            return Err(RulesError::CoinFlipNotActive);
        }
        let winner = self.rng.pick_player(self.player_count);
        debug!(seed = self.rng.seed(), %winner, "coin flipped");
        self.resolve_coin_flip(winner)?;
        Ok(winner)
    }

    /// Record a coin flip resolved elsewhere.
    pub fn resolve_coin_flip(&mut self, winner: PlayerId) -> Result<(), RulesError> {
        if self.phase != Phase::CoinFlip {
            return Err(RulesError::CoinFlipNotActive);
        }
        if winner.index() >= self.player_count {
            return Err(RulesError::UnknownPlayer(winner));
        }
        info!(%winner, "coin toss resolved");
        self.coin_toss_winner = Some(winner);
        Ok(())
    }

    #[must_use]
    pub fn coin_toss_winner(&self) -> Option<PlayerId> {
        self.coin_toss_winner
    }

    // === Round state ===

    /// Advance to the next round state. Only the cyclic successor is accepted.
    pub fn set_round_state(&mut self, next: RoundState) -> Result<(), RulesError> {
        let Phase::Playing(current) = self.phase else {
            return Err(RulesError::InvalidRoundTransition { from: None, to: next });
        };
        if current.next() != next {
            return Err(RulesError::InvalidRoundTransition {
                from: Some(current),
                to: next,
            });
        }
        info!(from = ?current, to = ?next, round = self.rounds_played, "round state changed");
        self.phase = Phase::Playing(next);
        self.handle_round_state_change(Some(current), next);
        Ok(())
    }

    /// Register a callback fired after every round state change.
    pub fn subscribe_round_state_changed(&mut self, listener: impl FnMut(RoundState) + Send + 'static) {
        self.round_listeners.push(Box::new(listener));
    }

    fn handle_round_state_change(&mut self, previous: Option<RoundState>, next: RoundState) {
        match next {
            RoundState::CollectionPhase => self.notify_collection_phase_start(previous),
            RoundState::FirstActionPhase => {
                let player = self.first_player_this_round();
                self.notify_action_phase_start(player);
            }
            RoundState::SecondActionPhase => {
                let player = self.first_player_this_round().next(self.player_count);
                self.notify_action_phase_start(player);
            }
            RoundState::EndRoundPhase => self.notify_end_round_phase_start(),
        }
        for listener in &mut self.round_listeners {
            listener(next);
        }
    }

    fn notify_collection_phase_start(&mut self, previous: Option<RoundState>) {
        if previous == Some(RoundState::EndRoundPhase) {
            self.rounds_played += 1;
        }
        self.action_phase_player = None;
    }

    fn notify_action_phase_start(&mut self, player: PlayerId) {
        self.action_phase_player = Some(player);
        self.ledger.begin_turn(player);
        self.ledger.clear_pending();
        self.interrupted_action_time = None;

        let earned = self.ledger.take_bonus(player);
        let duration = match &self.rules {
            Some(rules) => rules.action_phase_duration(earned),
            None => Countdown::Infinite,
        };
        debug!(%player, ?duration, earned, "action phase started");
        self.activate_tick_timer(TimerReason::ActionPhase, duration);
    }

    fn notify_end_round_phase_start(&mut self) {
        self.deactivate_tick_timer();
        self.ledger.clear_pending();
        self.interrupted_action_time = None;
        self.action_phase_player = None;
    }

    /// The coin toss winner opens the first round; openers alternate after.
    fn first_player_this_round(&self) -> PlayerId {
        let winner = self.coin_toss_winner.unwrap_or(PlayerId::new(0));
        if self.rounds_played % 2 == 0 {
            winner
        } else {
            winner.next(self.player_count)
        }
    }

    #[must_use]
    pub fn action_phase_player(&self) -> Option<PlayerId> {
        self.action_phase_player
    }

    /// The other seat in a two-player match; `None` for an unseated id.
    #[must_use]
    pub fn opposing_player(&self, player: PlayerId) -> Option<PlayerId> {
        (player.index() < self.player_count).then(|| player.next(self.player_count))
    }

    #[must_use]
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    // === Timer ===

    /// Start a countdown for `state`. `-1` means infinite.
    ///
    /// Replacing a custom timer reports it to its callback as skipped.
    pub fn activate_timer(&mut self, state: TimerState, seconds: i32) -> Result<(), RulesError> {
        self.require_not_over()?;
        let reason = TimerReason::from_state(state).ok_or(RulesError::InvalidTimerState(state))?;
        let duration = Countdown::from_seconds(seconds).ok_or(RulesError::InvalidTimerState(state))?;
        self.activate_tick_timer(reason, duration);
        Ok(())
    }

    /// Start a custom countdown. `on_finished` runs once: `false` when the
    /// time runs out, `true` when the timer is cancelled or replaced.
    pub fn activate_custom_timer(
        &mut self,
        seconds: i32,
        on_finished: impl FnOnce(bool) + Send + 'static,
    ) -> Result<(), RulesError> {
        self.require_not_over()?;
        let duration = Countdown::from_seconds(seconds).ok_or(RulesError::InvalidTimerState(TimerState::Custom))?;
        match self.timer.state() {
            TimerState::None | TimerState::Custom => {}
            busy => return Err(RulesError::TimerBusy(busy)),
        }
        self.deactivate_tick_timer();
        self.custom_timer_finished = Some(Box::new(on_finished));
        self.timer.activate(TimerReason::Custom, duration);
        debug!(?duration, "custom timer started");
        Ok(())
    }

    /// Cancel the custom timer, if one is running.
    pub fn deactivate_custom_timer(&mut self) {
        if self.timer.state() == TimerState::Custom {
            self.deactivate_tick_timer();
        }
    }

    /// Cancel whatever the timer is counting down.
    pub fn deactivate_timer(&mut self) {
        self.deactivate_tick_timer();
    }

    pub fn set_timer_paused(&mut self, paused: bool) -> Result<(), RulesError> {
        self.require_not_over()?;
        self.timer.set_paused(paused);
        Ok(())
    }

    /// Rejects writes once the match has finished, emptied or aborted.
    pub(super) fn require_not_over(&self) -> Result<(), RulesError> {
        if self.match_state().is_over() {
            Err(RulesError::MatchNotInProgress)
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn is_timer_active(&self) -> bool {
        self.timer.is_active()
    }

    #[must_use]
    pub fn is_timer_paused(&self) -> bool {
        self.timer.is_paused()
    }

    #[must_use]
    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    /// Time left on the active countdown; zero when idle.
    #[must_use]
    pub fn countdown_time_remaining(&self) -> Countdown {
        self.timer.remaining().unwrap_or(Countdown::Finite(0))
    }

    #[must_use]
    pub fn is_action_phase_timed(&self) -> bool {
        self.rules.as_ref().is_some_and(RulesSnapshot::is_action_phase_timed)
    }

    /// Run one countdown tick.
    pub fn tick_timer(&mut self) {
        if let TickOutcome::Finished(reason) = self.timer.tick() {
            self.handle_timer_finished(reason);
        }
    }

    /// Advance game time, ticking the countdown once per whole second.
    ///
    /// Stops early once the countdown is idle, paused or infinite, since the
    /// remaining ticks of this step could not change anything.
    pub fn advance(&mut self, delta_seconds: f32) {
        let ticks = self.clock.advance(delta_seconds);
        for _ in 0..ticks {
            match self.timer.tick() {
                TickOutcome::Finished(reason) => self.handle_timer_finished(reason),
                TickOutcome::Running(Countdown::Finite(_)) => {}
                _ => break,
            }
        }
    }

    fn activate_tick_timer(&mut self, reason: TimerReason, duration: Countdown) {
        if let Some(previous) = self.timer.activate(reason, duration) {
            self.on_timer_replaced(previous);
        }
    }

    fn deactivate_tick_timer(&mut self) {
        if let Some(previous) = self.timer.deactivate() {
            self.on_timer_replaced(previous);
        }
    }

    fn on_timer_replaced(&mut self, previous: TimerReason) {
        if previous == TimerReason::Custom {
            self.execute_custom_timer_finished(true);
        }
    }

    fn execute_custom_timer_finished(&mut self, skipped: bool) {
        if let Some(callback) = self.custom_timer_finished.take() {
            callback(skipped);
        }
    }

    fn handle_timer_finished(&mut self, reason: TimerReason) {
        debug!(?reason, "timer finished");
        match reason {
            TimerReason::ActionPhase => {
                if let Phase::Playing(round) = self.phase {
                    if round.is_action_phase() {
                        if let Err(err) = self.set_round_state(round.next()) {
                            warn!(%err, "action phase timeout could not advance the round");
                        }
                    }
                }
            }
            TimerReason::QuickEffect { .. } => self.resolve_selection_skipped(SpellContext::QuickEffect),
            TimerReason::BonusSpell => self.resolve_selection_skipped(SpellContext::BonusSpell),
            TimerReason::Custom => self.execute_custom_timer_finished(false),
        }
    }

    // === Match time ===

    /// Seconds since the coin flip started; frozen once the match ends.
    #[must_use]
    pub fn match_time_seconds(&self) -> f32 {
        self.clock.match_time_seconds()
    }

    // === Sync ===

    /// Snapshot of every replicated field.
    #[must_use]
    pub fn replicated_state(&self) -> ReplicatedState {
        ReplicatedState {
            match_state: self.match_state(),
            round_state: self.round_state(),
            coin_toss_winner: self.coin_toss_winner,
            action_phase_player: self.action_phase_player,
            timer_state: self.timer.state(),
            time_remaining: self.timer.remaining(),
            health_reports: self.health_reports.clone(),
            rules: self.rules.clone(),
            rounds_played: self.rounds_played,
            winner: self.match_winner,
            win_condition: self.win_condition,
        }
    }

    /// Take every notification emitted since the last drain, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox).into_vec()
    }

    /// Every resolved action this match.
    #[must_use]
    pub fn history(&self) -> &im::Vector<ActionRecord> {
        self.ledger.history()
    }

    fn multicast(&mut self, notification: Notification) {
        debug!(?notification, "multicast");
        self.outbox.push(notification);
    }

    fn record(&mut self, player: Option<PlayerId>, entry: LedgerEntry) {
        self.ledger.record(self.rounds_played, player, entry);
    }
}
