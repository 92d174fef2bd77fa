use std::collections::VecDeque;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::Board;
use crate::core::TileId;

/// Rectangular 4-neighbour board.
///
/// Tile ids are row-major (`y * width + x`). Distance is Manhattan distance;
/// paths avoid blocked and occupied tiles except the destination check, which
/// the caller decides on.
#[derive(Clone, Debug)]
pub struct GridBoard {
    width: u32,
    height: u32,
    tile_size: f32,
    blocked: FxHashSet<TileId>,
    occupied: FxHashSet<TileId>,
}

impl GridBoard {
    /// Create an empty board.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Board must have at least one tile");
        Self {
            width,
            height,
            tile_size: 100.0,
            blocked: FxHashSet::default(),
            occupied: FxHashSet::default(),
        }
    }

    /// Set the world-space size of a tile.
    #[must_use]
    pub fn with_tile_size(mut self, size: f32) -> Self {
        self.tile_size = size;
        self
    }

    /// Tile at a grid coordinate.
    #[must_use]
    pub fn tile(&self, x: u32, y: u32) -> TileId {
        TileId::new(y * self.width + x)
    }

    /// Grid coordinate of a tile, `None` when off the board.
    #[must_use]
    pub fn coords(&self, tile: TileId) -> Option<(u32, u32)> {
        let raw = tile.raw();
        if raw >= self.width * self.height {
            return None;
        }
        Some((raw % self.width, raw / self.width))
    }

    /// Make a tile impassable.
    pub fn block(&mut self, tile: TileId) {
        self.blocked.insert(tile);
    }

    /// Mark whether a piece stands on a tile.
    pub fn set_occupied(&mut self, tile: TileId, occupied: bool) {
        if occupied {
            self.occupied.insert(tile);
        } else {
            self.occupied.remove(&tile);
        }
    }

    fn walkable(&self, tile: TileId) -> bool {
        !self.blocked.contains(&tile) && !self.occupied.contains(&tile)
    }

    fn neighbours(&self, tile: TileId) -> SmallVec<[TileId; 4]> {
        let mut out = SmallVec::new();
        if let Some((x, y)) = self.coords(tile) {
            if x > 0 {
                out.push(self.tile(x - 1, y));
            }
            if x + 1 < self.width {
                out.push(self.tile(x + 1, y));
            }
            if y > 0 {
                out.push(self.tile(x, y - 1));
            }
            if y + 1 < self.height {
                out.push(self.tile(x, y + 1));
            }
        }
        out
    }
}

impl Board for GridBoard {
    fn distance(&self, from: TileId, to: TileId) -> u32 {
        match (self.coords(from), self.coords(to)) {
            (Some((ax, ay)), Some((bx, by))) => ax.abs_diff(bx) + ay.abs_diff(by),
            _ => u32::MAX,
        }
    }

    fn find_path(&self, from: TileId, to: TileId) -> Option<Vec<TileId>> {
        self.coords(from)?;
        self.coords(to)?;
        if from == to {
            return Some(Vec::new());
        }
        if !self.walkable(to) {
            return None;
        }

        let mut came_from: FxHashMap<TileId, TileId> = FxHashMap::default();
        let mut frontier = VecDeque::from([from]);
        came_from.insert(from, from);

        while let Some(current) = frontier.pop_front() {
            if current == to {
                let mut path = vec![to];
                let mut step = to;
                while let Some(&prev) = came_from.get(&step) {
                    if prev == from {
                        break;
                    }
                    path.push(prev);
                    step = prev;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.neighbours(current) {
                if self.walkable(next) && !came_from.contains_key(&next) {
                    came_from.insert(next, current);
                    frontier.push_back(next);
                }
            }
        }
        None
    }

    fn tiles_in_range(&self, origin: TileId, range: u32) -> Vec<TileId> {
        if self.coords(origin).is_none() {
            return Vec::new();
        }
        (0..self.width * self.height)
            .map(TileId::new)
            .filter(|&t| t != origin && self.distance(origin, t) <= range)
            .collect()
    }

    fn is_occupied(&self, tile: TileId) -> bool {
        self.occupied.contains(&tile)
    }

    fn tile_location(&self, tile: TileId) -> Option<Vec3> {
        let (x, y) = self.coords(tile)?;
        Some(Vec3::new(x as f32 * self.tile_size, y as f32 * self.tile_size, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_roundtrip_and_bounds() {
        let board = GridBoard::new(4, 3);
        let tile = board.tile(2, 1);

        assert_eq!(tile, TileId::new(6));
        assert_eq!(board.coords(tile), Some((2, 1)));
        assert_eq!(board.coords(TileId::new(12)), None);
    }

    #[test]
    fn test_manhattan_distance() {
        let board = GridBoard::new(5, 5);
        assert_eq!(board.distance(board.tile(0, 0), board.tile(3, 2)), 5);
        assert_eq!(board.distance(board.tile(0, 0), TileId::new(99)), u32::MAX);
    }

    #[test]
    fn test_path_excludes_start() {
        let board = GridBoard::new(5, 1);
        let path = board.find_path(board.tile(0, 0), board.tile(3, 0)).unwrap();

        assert_eq!(path, vec![board.tile(1, 0), board.tile(2, 0), board.tile(3, 0)]);
        assert_eq!(board.find_path(board.tile(2, 0), board.tile(2, 0)), Some(vec![]));
    }

    #[test]
    fn test_path_routes_around_blocks() {
        let mut board = GridBoard::new(3, 3);
        board.block(board.tile(1, 0));
        board.block(board.tile(1, 1));

        let path = board.find_path(board.tile(0, 0), board.tile(2, 0)).unwrap();
        assert_eq!(path.len(), 6);

        board.block(board.tile(1, 2));
        assert_eq!(board.find_path(board.tile(0, 0), board.tile(2, 0)), None);
    }

    #[test]
    fn test_occupied_destination_unreachable() {
        let mut board = GridBoard::new(3, 1);
        board.set_occupied(board.tile(2, 0), true);

        assert!(board.is_occupied(board.tile(2, 0)));
        assert_eq!(board.find_path(board.tile(0, 0), board.tile(2, 0)), None);
    }

    #[test]
    fn test_tiles_in_range() {
        let board = GridBoard::new(5, 5);
        let tiles = board.tiles_in_range(board.tile(2, 2), 1);

        assert_eq!(tiles.len(), 4);
        assert!(!tiles.contains(&board.tile(2, 2)));
    }

    #[test]
    fn test_tile_location() {
        let board = GridBoard::new(2, 2).with_tile_size(10.0);
        assert_eq!(board.tile_location(board.tile(1, 1)), Some(Vec3::new(10.0, 10.0, 0.0)));
        assert_eq!(board.tile_location(TileId::new(4)), None);
    }
}
