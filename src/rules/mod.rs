//! Frozen per-match rules.
//!
//! The authority copies the configured `MatchRules` into a `RulesSnapshot`
//! once at match setup. Every later query reads the snapshot, and observers
//! receive it through replication, so the rules cannot drift mid match.

mod snapshot;

pub use snapshot::{RulesSnapshot, SpellCasts};
