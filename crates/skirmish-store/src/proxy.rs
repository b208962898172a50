//! Read-only, always-current views of a unit.

use serde_json::Value;
use skirmish_core::{ColdData, Team, UnitId, UnitQuery, UnitState, Vec2};

/// A live view of one unit.
///
/// A proxy stores nothing but the id and a reference to the store, so
/// every getter reflects the store as it is now. Once the unit is
/// removed, getters fall back to neutral values: zero hit points, the
/// origin, [`UnitState::Dead`], and [`UnitProxy::exists`] is `false`.
#[derive(Clone, Copy)]
pub struct UnitProxy<'a> {
    id: &'a UnitId,
    query: &'a dyn UnitQuery,
}

impl<'a> UnitProxy<'a> {
    /// View `id` through `query`.
    pub fn new(id: &'a UnitId, query: &'a dyn UnitQuery) -> Self {
        Self { id, query }
    }

    /// The unit's id.
    pub fn id(&self) -> &'a UnitId {
        self.id
    }

    /// Whether the unit is still stored.
    pub fn exists(&self) -> bool {
        self.query.contains(self.id)
    }

    /// Slot currently holding the unit.
    pub fn index(&self) -> Option<usize> {
        self.query.index_of(self.id)
    }

    /// Ground position.
    pub fn position(&self) -> Vec2 {
        self.query.position(self.id).unwrap_or_default()
    }

    /// Height above ground.
    pub fn z(&self) -> f32 {
        self.query.z(self.id).unwrap_or(0.0)
    }

    /// Pending intended movement.
    pub fn intended_move(&self) -> Vec2 {
        self.query.intended_move(self.id).unwrap_or_default()
    }

    /// Current hit points.
    pub fn hp(&self) -> f32 {
        self.query.hp(self.id).unwrap_or(0.0)
    }

    /// Hit point ceiling.
    pub fn max_hp(&self) -> f32 {
        self.query.max_hp(self.id).unwrap_or(0.0)
    }

    /// Strike damage.
    pub fn damage(&self) -> f32 {
        self.query.damage(self.id).unwrap_or(0.0)
    }

    /// Mass; a removed unit reads 1.
    pub fn mass(&self) -> f32 {
        self.query.mass(self.id).unwrap_or(1.0)
    }

    /// Allegiance.
    pub fn team(&self) -> Team {
        self.query.team(self.id).unwrap_or_default()
    }

    /// Lifecycle state; a removed unit reads dead.
    pub fn state(&self) -> UnitState {
        self.query.state(self.id).unwrap_or(UnitState::Dead)
    }

    /// Stored and not dead.
    pub fn is_alive(&self) -> bool {
        self.state() != UnitState::Dead
    }

    /// Cold attributes.
    pub fn cold(&self) -> Option<&'a ColdData> {
        let query: &'a dyn UnitQuery = self.query;
        query.cold(self.id)
    }

    /// Whether the unit carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.cold().is_some_and(|c| c.has_tag(tag))
    }

    /// A metadata entry.
    pub fn meta(&self, key: &str) -> Option<&'a Value> {
        self.cold()?.meta.get(key)
    }

    /// A boolean metadata flag.
    pub fn flag(&self, key: &str) -> bool {
        self.cold().is_some_and(|c| c.flag(key))
    }

    /// Whether the two units fight each other.
    pub fn is_enemy_of(&self, other: &UnitProxy<'_>) -> bool {
        self.team().is_enemy_of(other.team())
    }

    /// Ground distance to another unit.
    pub fn distance_to(&self, other: &UnitProxy<'_>) -> f32 {
        self.position().distance(other.position())
    }
}

impl std::fmt::Debug for UnitProxy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitProxy")
            .field("id", self.id)
            .field("exists", &self.exists())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitManager;
    use skirmish_core::{UnitRecord, UnitWriter};

    #[test]
    fn proxy_reads_live_values() {
        let mut m = UnitManager::new(2);
        m.add(UnitRecord::new("a", Team::Friendly, Vec2::new(1.0, 2.0)))
            .unwrap();
        let id = UnitId::from("a");

        let hp_before = UnitProxy::new(&id, &m).hp();
        m.set_hp(&id, 40.0);
        let p = UnitProxy::new(&id, &m);
        assert_eq!(hp_before, 100.0);
        assert_eq!(p.hp(), 40.0);
        assert_eq!(p.position(), Vec2::new(1.0, 2.0));
        assert!(p.exists());
        assert!(p.is_alive());
    }

    #[test]
    fn removed_unit_reads_neutral_defaults() {
        let mut m = UnitManager::new(2);
        m.add(UnitRecord::new("a", Team::Hostile, Vec2::new(5.0, 5.0)))
            .unwrap();
        let id = UnitId::from("a");
        m.remove_unit(&id);

        let p = UnitProxy::new(&id, &m);
        assert!(!p.exists());
        assert_eq!(p.hp(), 0.0);
        assert_eq!(p.state(), UnitState::Dead);
        assert_eq!(p.position(), Vec2::ZERO);
        assert!(p.cold().is_none());
        assert!(!p.is_alive());
    }
}
