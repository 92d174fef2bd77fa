//! Handles into externally owned tables.
//!
//! The rules engine never owns board pieces or tiles. It refers to them by
//! stable integer keys that the board and session collaborators resolve:
//!
//! - `EntityId`: a board piece (tower, castle) spawned by the host.
//! - `TileId`: a cell of the board.
//! - `TowerTypeId`: a tower archetype from the match rules.

use serde::{Deserialize, Serialize};

/// Handle of a board piece owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity handle.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Handle of a board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl TileId {
    /// Create a new tile handle.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tile({})", self.0)
    }
}

/// Tower archetype identifier. The match rules list which archetypes exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerTypeId(pub u16);

impl TowerTypeId {
    /// Create a new archetype ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TowerTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TowerType({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", EntityId(42)), "Entity(42)");
        assert_eq!(format!("{}", TileId(7)), "Tile(7)");
        assert_eq!(format!("{}", TowerTypeId(3)), "TowerType(3)");
    }

    #[test]
    fn test_serialization() {
        let tile = TileId::new(123);
        let json = serde_json::to_string(&tile).unwrap();
        let back: TileId = serde_json::from_str(&json).unwrap();
        assert_eq!(tile, back);
        assert_eq!(back.raw(), 123);
    }
}
