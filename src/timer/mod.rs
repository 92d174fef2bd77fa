//! Countdown timer multiplexed over timer reasons.
//!
//! The game state owns exactly one countdown. What it is counting down (the
//! action phase, a quick effect window, a bonus spell window or a custom
//! timer) is carried by the active `TimerReason`, so two reasons can never be
//! active at once.
//!
//! The timer is driven from outside on a fixed cadence (one `tick` per second
//! of game time). Pausing keeps that cadence but skips the decrement, so
//! unpausing resumes without drifting.

mod countdown;

pub use countdown::{Countdown, CountdownTimer, TickOutcome, TimerReason};

use serde::{Deserialize, Serialize};

/// What the timer is currently counting down. This is the replicated tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerState {
    /// Counting down the action phase.
    ActionPhase,
    /// Counting down quick effect selection.
    QuickEffect,
    /// Counting down bonus spell selection.
    BonusSpell,
    /// Counting down a custom timer (reports through its own callback).
    Custom,
    /// Timer is inactive.
    #[default]
    None,
}
