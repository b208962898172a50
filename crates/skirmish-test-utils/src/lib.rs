//! Test utilities and mock types for Skirmish development.
//!
//! Provides a map-backed [`MockUnitQuery`] for exercising read-side code
//! without a real store, world builders for common layouts, and the rule
//! fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use indexmap::IndexMap;
use skirmish_core::{ColdData, Team, UnitId, UnitQuery, UnitRecord, UnitState, Vec2};
use skirmish_store::{ProjectileStore, UnitManager};

/// Mock implementation of [`UnitQuery`].
///
/// Backed by an `IndexMap<UnitId, UnitRecord>`; the "slot" of a unit is
/// its insertion position.
#[derive(Default)]
pub struct MockUnitQuery {
    units: IndexMap<UnitId, UnitRecord>,
}

impl MockUnitQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a unit.
    pub fn insert(&mut self, record: UnitRecord) {
        self.units.insert(record.id.clone(), record);
    }

    /// Mutate a unit in place, as a command would.
    pub fn edit(&mut self, id: &UnitId, f: impl FnOnce(&mut UnitRecord)) {
        if let Some(r) = self.units.get_mut(id) {
            f(r);
        }
    }

    /// Drop a unit.
    pub fn remove(&mut self, id: &UnitId) -> Option<UnitRecord> {
        self.units.shift_remove(id)
    }

    fn get(&self, id: &UnitId) -> Option<&UnitRecord> {
        self.units.get(id)
    }
}

impl UnitQuery for MockUnitQuery {
    fn index_of(&self, id: &UnitId) -> Option<usize> {
        self.units.get_index_of(id)
    }

    fn id_at(&self, index: usize) -> Option<&UnitId> {
        self.units.get_index(index).map(|(id, _)| id)
    }

    fn unit_ids(&self) -> Vec<UnitId> {
        self.units.keys().cloned().collect()
    }

    fn unit_count(&self) -> usize {
        self.units.len()
    }

    fn position(&self, id: &UnitId) -> Option<Vec2> {
        self.get(id).map(|r| r.position)
    }

    fn z(&self, id: &UnitId) -> Option<f32> {
        self.get(id).map(|r| r.z)
    }

    fn intended_move(&self, id: &UnitId) -> Option<Vec2> {
        self.get(id).map(|r| r.intended_move)
    }

    fn hp(&self, id: &UnitId) -> Option<f32> {
        self.get(id).map(|r| r.hp)
    }

    fn max_hp(&self, id: &UnitId) -> Option<f32> {
        self.get(id).map(|r| r.max_hp)
    }

    fn damage(&self, id: &UnitId) -> Option<f32> {
        self.get(id).map(|r| r.damage)
    }

    fn mass(&self, id: &UnitId) -> Option<f32> {
        self.get(id).map(|r| r.mass)
    }

    fn team(&self, id: &UnitId) -> Option<Team> {
        self.get(id).map(|r| r.team)
    }

    fn state(&self, id: &UnitId) -> Option<UnitState> {
        self.get(id).map(|r| r.state)
    }

    fn cold(&self, id: &UnitId) -> Option<&ColdData> {
        self.get(id).map(|r| &r.cold)
    }
}

// ── World builders ─────────────────────────────────────────────────

/// Two opposing units `x` tiles apart on the same row: `"friend"` at
/// `(5, 5)` and `"foe"` at `(5 + x, 5)`, each with `hp` and `damage`.
pub fn duel(x: f32, hp: f32, damage: f32) -> UnitManager {
    let mut units = UnitManager::new(16);
    for (id, team, pos) in [
        ("friend", Team::Friendly, Vec2::new(5.0, 5.0)),
        ("foe", Team::Hostile, Vec2::new(5.0 + x, 5.0)),
    ] {
        let r = UnitRecord::new(id, team, pos)
            .with_hp(hp)
            .with_damage(damage);
        // Capacity 16 always fits two units.
        let _ = units.add(r);
    }
    units
}

/// A grid of `rows × cols` units one tile apart starting at `(1, 1)`,
/// alternating teams by column. Ids are `"r{row}c{col}"`.
pub fn formation(rows: usize, cols: usize) -> UnitManager {
    let mut units = UnitManager::new((rows * cols).max(1));
    for r in 0..rows {
        for c in 0..cols {
            let team = if c % 2 == 0 {
                Team::Friendly
            } else {
                Team::Hostile
            };
            let pos = Vec2::new(1.0 + c as f32, 1.0 + r as f32);
            let _ = units.add(UnitRecord::new(format!("r{r}c{c}"), team, pos));
        }
    }
    units
}

/// An empty projectile store with room for `n`.
pub fn projectiles(n: usize) -> ProjectileStore {
    ProjectileStore::new(n)
}

/// Unit templates in the factory JSON format.
pub const SAMPLE_TEMPLATES: &str = r#"{
    "grunt":  {"hp": 30, "damage": 4, "mass": 1, "tags": ["ai"], "sprite": "grunt"},
    "brute":  {"hp": 80, "damage": 9, "mass": 3, "tags": ["ai"], "posture": "aggressive"},
    "imp":    {"hp": 10, "damage": 2, "mass": 0.5, "tags": ["ai", "flying"]},
    "turret": {"hp": 60, "damage": 6, "mass": 10, "posture": "hold", "abilities": ["firebolt"]}
}"#;

/// Ability specs in the ability book JSON format.
pub const SAMPLE_ABILITIES: &str = r#"[
    {"name": "firebolt", "cooldown": 5, "range": 6, "target": "nearest_enemy",
     "effects": [{"type": "damage", "amount": 8},
                 {"type": "status", "status": "burn", "duration": 3, "amount": 2}]},
    {"name": "mend", "cooldown": 10, "range": 0, "target": "self",
     "effects": [{"type": "heal", "amount": 15}]},
    {"name": "leap", "cooldown": 20, "range": 8, "target": "nearest_enemy",
     "effects": [{"type": "jump", "duration": 6, "height": 1.5}]}
]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_query_orders_by_insertion() {
        let mut q = MockUnitQuery::new();
        q.insert(UnitRecord::new("b", Team::Hostile, Vec2::ZERO));
        q.insert(UnitRecord::new("a", Team::Friendly, Vec2::ZERO));
        assert_eq!(q.index_of(&"a".into()), Some(1));
        assert_eq!(q.id_at(0), Some(&UnitId::from("b")));
        q.edit(&"a".into(), |r| r.hp = 3.0);
        assert_eq!(q.hp(&"a".into()), Some(3.0));
    }

    #[test]
    fn builders_produce_expected_layouts() {
        let d = duel(1.0, 50.0, 10.0);
        assert_eq!(d.len(), 2);
        assert_eq!(d.position(&"foe".into()), Some(Vec2::new(6.0, 5.0)));
        let f = formation(2, 3);
        assert_eq!(f.len(), 6);
        assert_eq!(f.team(&"r1c1".into()), Some(Team::Hostile));
    }
}
