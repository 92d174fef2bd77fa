use serde::{Deserialize, Serialize};

use super::Roster;
use crate::core::{PlayerId, PlayerMap, TileId};

/// Session data for one seat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub current_tile: Option<TileId>,
    pub castle_tile: Option<TileId>,
    pub portal_tile: Option<TileId>,
    pub gold: u32,
    pub mana: u32,
}

/// In-memory roster backed by a `PlayerMap`.
#[derive(Clone, Debug)]
pub struct SimpleRoster {
    seats: PlayerMap<SeatInfo>,
}

impl SimpleRoster {
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            seats: PlayerMap::with_default(player_count),
        }
    }

    /// Replace a seat's session data.
    #[must_use]
    pub fn with_seat(mut self, player: PlayerId, seat: SeatInfo) -> Self {
        if let Some(slot) = self.seats.get_mut(player) {
            *slot = seat;
        }
        self
    }

    pub fn seat_mut(&mut self, player: PlayerId) -> Option<&mut SeatInfo> {
        self.seats.get_mut(player)
    }

    fn seat(&self, player: PlayerId) -> SeatInfo {
        self.seats.get(player).copied().unwrap_or_default()
    }
}

impl Roster for SimpleRoster {
    fn player_count(&self) -> usize {
        self.seats.player_count()
    }

    fn current_tile(&self, player: PlayerId) -> Option<TileId> {
        self.seat(player).current_tile
    }

    fn castle_tile(&self, player: PlayerId) -> Option<TileId> {
        self.seat(player).castle_tile
    }

    fn portal_tile(&self, player: PlayerId) -> Option<TileId> {
        self.seat(player).portal_tile
    }

    fn gold(&self, player: PlayerId) -> u32 {
        self.seat(player).gold
    }

    fn mana(&self, player: PlayerId) -> u32 {
        self.seat(player).mana
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_seat_reads_empty() {
        let roster = SimpleRoster::new(2);
        assert_eq!(roster.gold(PlayerId::new(5)), 0);
        assert_eq!(roster.castle_tile(PlayerId::new(5)), None);
    }

    #[test]
    fn test_seat_updates() {
        let mut roster = SimpleRoster::new(2).with_seat(
            PlayerId::new(1),
            SeatInfo {
                current_tile: Some(TileId::new(4)),
                gold: 20,
                ..SeatInfo::default()
            },
        );
        assert_eq!(roster.current_tile(PlayerId::new(1)), Some(TileId::new(4)));

        roster.seat_mut(PlayerId::new(1)).unwrap().gold = 5;
        assert_eq!(roster.gold(PlayerId::new(1)), 5);
        assert_eq!(roster.player_count(), 2);
    }
}
