//! Per-round action bookkeeping.
//!
//! The ledger records who moved how far, what is pending between a request's
//! confirm and finish, which towers stand on the board, and the health
//! changes caused by the most recent action. Remaining-move and remaining-cast
//! counts are derived from it and the rules snapshot on every query; nothing
//! derived is stored.

mod health;
mod towers;
mod turn;

pub use health::{HealthChangeReport, HealthReports};
pub use towers::{BuiltTower, TowerInstanceTable};
pub use turn::{ActionRecord, LedgerEntry, PendingAction, SpellContext, TurnCounters, TurnLedger};
