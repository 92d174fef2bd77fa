//! # tower-conquest
//!
//! Server-authoritative match rules for a two-player turn-based tower game.
//!
//! ## Design Principles
//!
//! 1. **Single Writer**: One `GameState` per match holds every rule decision.
//!    Observers get snapshots and notifications, never write access.
//!
//! 2. **Validate Before Mutating**: Commands check phase, rules and turn
//!    counters first and report violations as `RulesError` values.
//!
//! 3. **Borrowed Collaborators**: The board and the player roster are passed
//!    in per call through `World`; the state never owns them.
//!
//! ## Match Flow
//!
//! A match waits for players, flips a coin, then plays rounds of
//! collection, two action phases (one per player) and end of round until a
//! win condition is met. A single countdown timer is shared by the action
//! phase, the quick effect and bonus spell selection windows, and custom
//! host timers.
//!
//! ## Modules
//!
//! - `core`: IDs, players, RNG, configuration, errors
//! - `timer`: The multiplexed countdown
//! - `flow`: Match and round states, match clock
//! - `rules`: Frozen rules snapshot
//! - `ledger`: Turn counters, pending requests, tower instances, health reports
//! - `board`: Board and roster collaborator traits
//! - `state`: The authoritative `GameState`
//! - `sync`: Replicated snapshots, notifications, observer replica
//! - `movement`: Pawn travel and tracking velocities

pub mod board;
pub mod core;
pub mod flow;
pub mod ledger;
pub mod movement;
pub mod rules;
pub mod state;
pub mod sync;
pub mod timer;

// Re-export commonly used types
pub use crate::core::{
    CoinFace, EntityId, GameRng, MatchRules, PlayerId, PlayerMap, RulesError, TileId,
    TowerArchetype, TowerTypeId, INFINITE_TIME,
};

pub use crate::timer::{Countdown, TimerReason, TimerState};

pub use crate::flow::{format_match_time, MatchState, MatchWinCondition, RoundState};

pub use crate::rules::{RulesSnapshot, SpellCasts};

pub use crate::ledger::{BuiltTower, HealthChangeReport, SpellContext};

pub use crate::board::{Board, GridBoard, Roster, SeatInfo, SimpleRoster, World};

pub use crate::state::GameState;

pub use crate::sync::{MirrorEvent, Notification, Replica, ReplicatedState, SyncMessage};

pub use crate::movement::{MovementUpdate, PawnMovement, TravelRequest};
