//! Collaborators the rules engine consults but does not own.
//!
//! The board (tiles, distances, pathfinding) and the session roster (where
//! each player's pawn, castle and portal are, and what they can spend) live
//! outside this crate. Operations that need them take a `World`, which only
//! borrows them for the duration of the call.
//!
//! `GridBoard` and `SimpleRoster` are small reference implementations.

mod grid;
mod roster;

pub use grid::GridBoard;
pub use roster::{SeatInfo, SimpleRoster};

use glam::Vec3;

use crate::core::{PlayerId, TileId};

/// Board queries.
pub trait Board {
    /// Tile distance between two tiles.
    fn distance(&self, from: TileId, to: TileId) -> u32;

    /// Shortest walkable path. The result excludes `from` and ends at `to`;
    /// `None` when unreachable.
    fn find_path(&self, from: TileId, to: TileId) -> Option<Vec<TileId>>;

    /// Tiles within `range` of `origin`, excluding `origin`.
    fn tiles_in_range(&self, origin: TileId, range: u32) -> Vec<TileId>;

    /// Whether a piece stands on the tile.
    fn is_occupied(&self, tile: TileId) -> bool;

    /// World location of the tile's center.
    fn tile_location(&self, tile: TileId) -> Option<Vec3>;
}

/// Player session lookups.
pub trait Roster {
    fn player_count(&self) -> usize;

    /// Tile the player's pawn stands on.
    fn current_tile(&self, player: PlayerId) -> Option<TileId>;

    fn castle_tile(&self, player: PlayerId) -> Option<TileId>;

    fn portal_tile(&self, player: PlayerId) -> Option<TileId>;

    fn gold(&self, player: PlayerId) -> u32;

    fn mana(&self, player: PlayerId) -> u32;
}

/// Borrowed collaborators for one call.
#[derive(Clone, Copy)]
pub struct World<'a> {
    /// The match board, `None` until it has been spawned.
    pub board: Option<&'a dyn Board>,
    pub roster: &'a dyn Roster,
}

impl<'a> World<'a> {
    /// A world with no board yet.
    pub fn new(roster: &'a dyn Roster) -> Self {
        Self { board: None, roster }
    }

    /// Attach the match board.
    #[must_use]
    pub fn with_board(mut self, board: &'a dyn Board) -> Self {
        self.board = Some(board);
        self
    }
}
