//! Core types: seats, handles, RNG, rule configuration and errors.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use entity::{EntityId, TileId, TowerTypeId};
pub use player::{PlayerId, PlayerMap};
pub use rng::{CoinFace, GameRng};
pub use config::{MatchRules, TowerArchetype, INFINITE_TIME};
pub use error::RulesError;
