use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Health change of one board piece caused by the latest action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthChangeReport {
    pub piece: EntityId,
    /// Owner of the piece, `None` for neutral pieces.
    pub owner: Option<PlayerId>,
    /// Negative for damage, positive for healing.
    pub delta: i32,
    /// The piece died from this change.
    pub dead: bool,
}

impl HealthChangeReport {
    #[must_use]
    pub fn new(piece: EntityId, owner: Option<PlayerId>, delta: i32) -> Self {
        Self {
            piece,
            owner,
            delta,
            dead: false,
        }
    }

    /// Mark the piece as killed by this change.
    #[must_use]
    pub fn killed(mut self) -> Self {
        self.dead = true;
        self
    }

    #[must_use]
    pub fn is_damage(&self) -> bool {
        self.delta < 0
    }

    #[must_use]
    pub fn is_heal(&self) -> bool {
        self.delta > 0
    }
}

/// Reports from the most recent resolved action. Replaced wholesale, never
/// accumulated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReports {
    reports: Vec<HealthChangeReport>,
}

impl HealthReports {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every report with the new action's reports.
    pub fn replace(&mut self, reports: Vec<HealthChangeReport>) {
        self.reports = reports;
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }

    #[must_use]
    pub fn as_slice(&self) -> &[HealthChangeReport] {
        &self.reports
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Filter the latest reports.
    ///
    /// `damaged` selects damage (true) or healing (false) reports; `owner`
    /// restricts to one player's pieces; `exclude_dead` drops pieces that died.
    #[must_use]
    pub fn query(&self, damaged: bool, owner: Option<PlayerId>, exclude_dead: bool) -> Vec<HealthChangeReport> {
        self.reports
            .iter()
            .filter(|r| if damaged { r.is_damage() } else { r.is_heal() })
            .filter(|r| owner.map_or(true, |o| r.owner == Some(o)))
            .filter(|r| !(exclude_dead && r.dead))
            .copied()
            .collect()
    }

    #[must_use]
    pub fn damage(&self, filter_out_dead: bool) -> Vec<HealthChangeReport> {
        self.query(true, None, filter_out_dead)
    }

    #[must_use]
    pub fn healing(&self) -> Vec<HealthChangeReport> {
        self.query(false, None, false)
    }

    #[must_use]
    pub fn players_damage(&self, player: PlayerId, filter_out_dead: bool) -> Vec<HealthChangeReport> {
        self.query(true, Some(player), filter_out_dead)
    }

    #[must_use]
    pub fn players_healing(&self, player: PlayerId) -> Vec<HealthChangeReport> {
        self.query(false, Some(player), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HealthReports {
        let p0 = Some(PlayerId::new(0));
        let p1 = Some(PlayerId::new(1));
        let mut reports = HealthReports::new();
        reports.replace(vec![
            HealthChangeReport::new(EntityId::new(1), p0, -3),
            HealthChangeReport::new(EntityId::new(2), p1, -5).killed(),
            HealthChangeReport::new(EntityId::new(3), p1, 2),
            HealthChangeReport::new(EntityId::new(4), None, -1),
            HealthChangeReport::new(EntityId::new(5), p0, 0),
        ]);
        reports
    }

    #[test]
    fn test_damage_and_healing_split() {
        let reports = sample();
        assert_eq!(reports.damage(false).len(), 3);
        assert_eq!(reports.damage(true).len(), 2);
        assert_eq!(reports.healing().len(), 1);
    }

    #[test]
    fn test_owner_filter() {
        let reports = sample();
        let p1 = PlayerId::new(1);

        assert_eq!(reports.players_damage(p1, false).len(), 1);
        assert!(reports.players_damage(p1, true).is_empty());
        assert_eq!(reports.players_healing(p1)[0].piece, EntityId::new(3));
    }

    #[test]
    fn test_replace_does_not_accumulate() {
        let mut reports = sample();
        reports.replace(vec![HealthChangeReport::new(EntityId::new(8), None, 4)]);

        assert!(reports.damage(false).is_empty());
        assert_eq!(reports.as_slice().len(), 1);

        reports.replace(Vec::new());
        assert!(reports.is_empty());
    }
}
