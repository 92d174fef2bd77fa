//! Seeded randomness for the authority.
//!
//! Only the server rolls dice. The coin flip that decides who acts first is
//! drawn from a `GameRng` seeded when the match is created, so a match can be
//! replayed from its seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Result of a coin flip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinFace {
    Heads,
    Tails,
}

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Flip a fair coin.
    pub fn flip_coin(&mut self) -> CoinFace {
        if self.inner.gen_bool(0.5) {
            CoinFace::Heads
        } else {
            CoinFace::Tails
        }
    }

    /// Pick one seat uniformly out of `player_count`.
    ///
    /// For two players this is a coin flip: heads picks seat 0.
    pub fn pick_player(&mut self, player_count: usize) -> PlayerId {
        if player_count <= 2 {
            return match self.flip_coin() {
                CoinFace::Heads => PlayerId::new(0),
                CoinFace::Tails => PlayerId::new(1.min(player_count.saturating_sub(1)) as u8),
            };
        }
        PlayerId::new(self.inner.gen_range(0..player_count) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_flips() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);

        for _ in 0..50 {
            assert_eq!(a.flip_coin(), b.flip_coin());
        }
    }

    #[test]
    fn test_both_faces_show_up() {
        let mut rng = GameRng::new(7);
        let flips: Vec<_> = (0..64).map(|_| rng.flip_coin()).collect();

        assert!(flips.contains(&CoinFace::Heads));
        assert!(flips.contains(&CoinFace::Tails));
    }

    #[test]
    fn test_pick_player_stays_seated() {
        let mut rng = GameRng::new(3);
        for count in 1..6 {
            for _ in 0..20 {
                assert!(rng.pick_player(count).index() < count);
            }
        }
    }
}
