use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TimerState;
use crate::core::INFINITE_TIME;

/// Time left on a countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Countdown {
    /// Whole seconds remaining.
    Finite(u32),
    /// Never expires on its own.
    Infinite,
}

impl Countdown {
    /// Convert a configured duration, where `-1` means infinite.
    ///
    /// Any other negative value is rejected.
    ///
    /// ```
    /// use tower_conquest::timer::Countdown;
    ///
    /// assert_eq!(Countdown::from_seconds(-1), Some(Countdown::Infinite));
    /// assert_eq!(Countdown::from_seconds(30), Some(Countdown::Finite(30)));
    /// assert_eq!(Countdown::from_seconds(-4), None);
    /// ```
    #[must_use]
    pub fn from_seconds(seconds: i32) -> Option<Self> {
        match seconds {
            INFINITE_TIME => Some(Self::Infinite),
            s if s >= 0 => Some(Self::Finite(s as u32)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Seconds remaining, `None` for infinite.
    #[must_use]
    pub fn seconds(self) -> Option<u32> {
        match self {
            Self::Finite(s) => Some(s),
            Self::Infinite => None,
        }
    }

    /// Add bonus seconds without going past `ceiling`.
    ///
    /// A value already above the ceiling is left as is; infinite stays infinite.
    #[must_use]
    pub fn with_bonus(self, bonus: u32, ceiling: u32) -> Self {
        match self {
            Self::Finite(s) if s >= ceiling => Self::Finite(s),
            Self::Finite(s) => Self::Finite(s.saturating_add(bonus).min(ceiling)),
            Self::Infinite => Self::Infinite,
        }
    }
}

/// Why the timer is running, with the data that window carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerReason {
    ActionPhase,
    /// Quick effect selection. `nullify` is set when the window only offers
    /// nullifying the incoming action.
    QuickEffect { nullify: bool },
    BonusSpell,
    Custom,
}

impl TimerReason {
    /// The replicated tag for this reason.
    #[must_use]
    pub fn state(self) -> TimerState {
        match self {
            Self::ActionPhase => TimerState::ActionPhase,
            Self::QuickEffect { .. } => TimerState::QuickEffect,
            Self::BonusSpell => TimerState::BonusSpell,
            Self::Custom => TimerState::Custom,
        }
    }

    /// Reason for a tag, `None` for `TimerState::None`.
    #[must_use]
    pub fn from_state(state: TimerState) -> Option<Self> {
        match state {
            TimerState::ActionPhase => Some(Self::ActionPhase),
            TimerState::QuickEffect => Some(Self::QuickEffect { nullify: false }),
            TimerState::BonusSpell => Some(Self::BonusSpell),
            TimerState::Custom => Some(Self::Custom),
            TimerState::None => None,
        }
    }
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No timer is active.
    Idle,
    /// Timer is paused; nothing was decremented.
    Paused,
    /// Timer decremented (or is infinite) and keeps running.
    Running(Countdown),
    /// Timer reached zero and is now inactive.
    Finished(TimerReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ActiveTimer {
    reason: TimerReason,
    remaining: Countdown,
    paused: bool,
}

/// The single countdown owned by the game state.
#[derive(Clone, Debug, Default)]
pub struct CountdownTimer {
    active: Option<ActiveTimer>,
}

impl CountdownTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the countdown for `reason`.
    ///
    /// Returns the reason that was running before, if any, so the caller can
    /// report it as cancelled.
    pub fn activate(&mut self, reason: TimerReason, duration: Countdown) -> Option<TimerReason> {
        let previous = self.deactivate();
        debug!(?reason, ?duration, "timer activated");
        self.active = Some(ActiveTimer {
            reason,
            remaining: duration,
            paused: false,
        });
        previous
    }

    /// Stop the countdown. Idempotent.
    pub fn deactivate(&mut self) -> Option<TimerReason> {
        self.active.take().map(|t| t.reason)
    }

    /// Advance one cadence step.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(timer) = self.active.as_mut() else {
            return TickOutcome::Idle;
        };
        if timer.paused {
            return TickOutcome::Paused;
        }

        match timer.remaining {
            Countdown::Infinite => TickOutcome::Running(Countdown::Infinite),
            Countdown::Finite(seconds) => {
                let left = seconds.saturating_sub(1);
                if left == 0 {
                    let reason = timer.reason;
                    self.active = None;
                    debug!(?reason, "timer finished");
                    TickOutcome::Finished(reason)
                } else {
                    timer.remaining = Countdown::Finite(left);
                    TickOutcome::Running(timer.remaining)
                }
            }
        }
    }

    /// Pause or resume decrementing. No effect when inactive.
    pub fn set_paused(&mut self, paused: bool) {
        if let Some(timer) = self.active.as_mut() {
            timer.paused = paused;
        }
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.active.map_or(false, |t| t.paused)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn reason(&self) -> Option<TimerReason> {
        self.active.map(|t| t.reason)
    }

    /// The replicated tag (`TimerState::None` when idle).
    #[must_use]
    pub fn state(&self) -> TimerState {
        self.active.map_or(TimerState::None, |t| t.reason.state())
    }

    /// Time left, `None` when idle.
    #[must_use]
    pub fn remaining(&self) -> Option<Countdown> {
        self.active.map(|t| t.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_then_finishes() {
        let mut timer = CountdownTimer::new();
        timer.activate(TimerReason::ActionPhase, Countdown::Finite(3));

        assert_eq!(timer.tick(), TickOutcome::Running(Countdown::Finite(2)));
        assert_eq!(timer.tick(), TickOutcome::Running(Countdown::Finite(1)));
        assert_eq!(timer.tick(), TickOutcome::Finished(TimerReason::ActionPhase));
        assert_eq!(timer.state(), TimerState::None);
        assert_eq!(timer.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_tick() {
        let mut timer = CountdownTimer::new();
        timer.activate(TimerReason::Custom, Countdown::Finite(0));
        assert_eq!(timer.tick(), TickOutcome::Finished(TimerReason::Custom));
    }

    #[test]
    fn test_infinite_never_finishes() {
        let mut timer = CountdownTimer::new();
        timer.activate(TimerReason::Custom, Countdown::Infinite);

        for _ in 0..1000 {
            assert_eq!(timer.tick(), TickOutcome::Running(Countdown::Infinite));
        }
        assert!(timer.is_active());
    }

    #[test]
    fn test_pause_skips_decrement() {
        let mut timer = CountdownTimer::new();
        timer.activate(TimerReason::ActionPhase, Countdown::Finite(5));
        timer.tick();
        timer.set_paused(true);

        for _ in 0..10 {
            assert_eq!(timer.tick(), TickOutcome::Paused);
        }
        assert_eq!(timer.remaining(), Some(Countdown::Finite(4)));

        timer.set_paused(false);
        assert_eq!(timer.tick(), TickOutcome::Running(Countdown::Finite(3)));
    }

    #[test]
    fn test_activate_replaces_previous_reason() {
        let mut timer = CountdownTimer::new();
        assert_eq!(timer.activate(TimerReason::Custom, Countdown::Finite(5)), None);

        let replaced = timer.activate(TimerReason::QuickEffect { nullify: true }, Countdown::Finite(10));
        assert_eq!(replaced, Some(TimerReason::Custom));
        assert_eq!(timer.state(), TimerState::QuickEffect);
        assert!(!timer.is_paused());
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut timer = CountdownTimer::new();
        timer.activate(TimerReason::BonusSpell, Countdown::Finite(5));

        assert_eq!(timer.deactivate(), Some(TimerReason::BonusSpell));
        assert_eq!(timer.deactivate(), None);
        assert!(!timer.is_active());
    }

    #[test]
    fn test_bonus_is_capped() {
        assert_eq!(Countdown::Finite(20).with_bonus(10, 60), Countdown::Finite(30));
        assert_eq!(Countdown::Finite(55).with_bonus(10, 60), Countdown::Finite(60));
        assert_eq!(Countdown::Finite(70).with_bonus(10, 60), Countdown::Finite(70));
        assert_eq!(Countdown::Infinite.with_bonus(10, 60), Countdown::Infinite);
    }

    #[test]
    fn test_reason_state_mapping() {
        for state in [TimerState::ActionPhase, TimerState::QuickEffect, TimerState::BonusSpell, TimerState::Custom] {
            assert_eq!(TimerReason::from_state(state).map(TimerReason::state), Some(state));
        }
        assert_eq!(TimerReason::from_state(TimerState::None), None);
    }
}
