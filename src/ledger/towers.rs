use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId, TowerTypeId};

/// A tower the host spawned after a confirmed build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltTower {
    pub entity: EntityId,
    pub archetype: TowerTypeId,
    pub owner: PlayerId,
}

#[derive(Clone, Copy, Debug)]
struct LiveTower {
    tower: BuiltTower,
    legendary: bool,
}

/// How many towers of each archetype stand on the board.
///
/// Counts are kept per owner and derived from the set of live instances, so
/// destroying the same instance twice only decrements once.
#[derive(Clone, Debug, Default)]
pub struct TowerInstanceTable {
    counts: FxHashMap<(PlayerId, TowerTypeId), u32>,
    live: FxHashMap<EntityId, LiveTower>,
}

impl TowerInstanceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new instance. Returns false if the entity was already live.
    pub fn add(&mut self, tower: BuiltTower, legendary: bool) -> bool {
        if self.live.contains_key(&tower.entity) {
            return false;
        }
        self.live.insert(tower.entity, LiveTower { tower, legendary });
        *self.counts.entry((tower.owner, tower.archetype)).or_insert(0) += 1;
        true
    }

    /// Remove an instance. Returns `None` if it was not live.
    pub fn remove(&mut self, entity: EntityId) -> Option<BuiltTower> {
        let LiveTower { tower, .. } = self.live.remove(&entity)?;
        let key = (tower.owner, tower.archetype);
        if let Some(count) = self.counts.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
        Some(tower)
    }

    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<BuiltTower> {
        self.live.get(&entity).map(|l| l.tower)
    }

    /// Instances of an archetype across all players.
    #[must_use]
    pub fn instance_count(&self, archetype: TowerTypeId) -> u32 {
        self.counts
            .iter()
            .filter(|((_, a), _)| *a == archetype)
            .map(|(_, c)| *c)
            .sum()
    }

    /// Instances of an archetype owned by one player.
    #[must_use]
    pub fn player_instance_count(&self, player: PlayerId, archetype: TowerTypeId) -> u32 {
        self.counts.get(&(player, archetype)).copied().unwrap_or(0)
    }

    /// Normal (non-legendary) towers a player owns.
    #[must_use]
    pub fn player_normal_count(&self, player: PlayerId) -> u32 {
        self.owned_by(player).filter(|l| !l.legendary).count() as u32
    }

    /// Legendary towers a player owns.
    #[must_use]
    pub fn player_legendary_count(&self, player: PlayerId) -> u32 {
        self.owned_by(player).filter(|l| l.legendary).count() as u32
    }

    /// Normal archetypes the player owns more than one of.
    #[must_use]
    pub fn player_duplicated_types(&self, player: PlayerId) -> u32 {
        let mut per_type: FxHashMap<TowerTypeId, u32> = FxHashMap::default();
        for live in self.owned_by(player).filter(|l| !l.legendary) {
            *per_type.entry(live.tower.archetype).or_insert(0) += 1;
        }
        per_type.values().filter(|&&n| n > 1).count() as u32
    }

    fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &LiveTower> {
        self.live.values().filter(move |l| l.tower.owner == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower(entity: u32, archetype: u16, owner: u8) -> BuiltTower {
        BuiltTower {
            entity: EntityId::new(entity),
            archetype: TowerTypeId::new(archetype),
            owner: PlayerId::new(owner),
        }
    }

    #[test]
    fn test_add_and_remove() {
        let mut table = TowerInstanceTable::new();
        let archer = TowerTypeId::new(1);

        assert!(table.add(tower(10, 1, 0), false));
        assert!(table.add(tower(11, 1, 1), false));
        assert_eq!(table.instance_count(archer), 2);
        assert_eq!(table.player_instance_count(PlayerId::new(0), archer), 1);

        assert!(table.remove(EntityId::new(10)).is_some());
        assert_eq!(table.instance_count(archer), 1);
        assert_eq!(table.player_instance_count(PlayerId::new(0), archer), 0);
    }

    #[test]
    fn test_no_double_counting() {
        let mut table = TowerInstanceTable::new();
        assert!(table.add(tower(10, 1, 0), false));
        assert!(!table.add(tower(10, 1, 0), false));
        assert_eq!(table.instance_count(TowerTypeId::new(1)), 1);

        assert!(table.remove(EntityId::new(10)).is_some());
        assert!(table.remove(EntityId::new(10)).is_none());
        assert_eq!(table.instance_count(TowerTypeId::new(1)), 0);
    }

    #[test]
    fn test_per_player_caps_inputs() {
        let mut table = TowerInstanceTable::new();
        let p0 = PlayerId::new(0);

        table.add(tower(1, 1, 0), false);
        table.add(tower(2, 1, 0), false);
        table.add(tower(3, 2, 0), false);
        table.add(tower(4, 2, 0), false);
        table.add(tower(5, 3, 0), false);
        table.add(tower(6, 9, 0), true);
        table.add(tower(7, 1, 1), false);

        assert_eq!(table.player_normal_count(p0), 5);
        assert_eq!(table.player_legendary_count(p0), 1);
        assert_eq!(table.player_duplicated_types(p0), 2);
        assert_eq!(table.player_duplicated_types(PlayerId::new(1)), 0);
    }
}
