//! The unit store: hot block, cold map and the id↔slot mapping.

use indexmap::IndexMap;
use skirmish_core::{
    ColdData, StoreError, Team, UnitId, UnitQuery, UnitRecord, UnitState, UnitWriter, Vec2,
};

use crate::block::UnitBlock;
use crate::cold::ColdStore;

/// Fixed-capacity unit storage.
///
/// Units are addressed by a stable [`UnitId`]; slots are an internal
/// detail that batch code may use for speed. Removing a unit frees its
/// slot and the next add takes the lowest free slot.
///
/// # Examples
///
/// ```
/// use skirmish_core::{Team, UnitQuery, UnitRecord, Vec2};
/// use skirmish_store::UnitManager;
///
/// let mut units = UnitManager::new(8);
/// let slot = units.add(UnitRecord::new("a", Team::Friendly, Vec2::ZERO)).unwrap();
/// assert_eq!(slot, 0);
/// assert_eq!(units.hp(&"a".into()), Some(100.0));
/// ```
#[derive(Clone, Debug)]
pub struct UnitManager {
    block: UnitBlock,
    cold: ColdStore,
    ids: Vec<Option<UnitId>>,
    index: IndexMap<UnitId, usize>,
}

impl UnitManager {
    /// A store with room for `capacity` units.
    pub fn new(capacity: usize) -> Self {
        Self {
            block: UnitBlock::new(capacity),
            cold: ColdStore::new(),
            ids: vec![None; capacity],
            index: IndexMap::with_capacity(capacity),
        }
    }

    /// Fixed capacity.
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// Number of stored units.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no units are stored.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Store a unit in the lowest free slot.
    ///
    /// Fails without touching the store on an empty id, a duplicate id,
    /// or when every slot is taken.
    pub fn add(&mut self, record: UnitRecord) -> Result<usize, StoreError> {
        if record.id.is_empty() {
            return Err(StoreError::EmptyId);
        }
        if self.index.contains_key(&record.id) {
            return Err(StoreError::DuplicateId { id: record.id });
        }
        let slot = self
            .block
            .first_free()
            .ok_or(StoreError::CapacityExceeded {
                capacity: self.capacity(),
            })?;

        self.block.write(slot, &record);
        self.cold.insert(slot, record.cold);
        self.index.insert(record.id.clone(), slot);
        self.ids[slot] = Some(record.id);
        Ok(slot)
    }

    /// Free a slot, returning the unit that occupied it.
    pub fn remove(&mut self, index: usize) -> Option<UnitRecord> {
        if !self.block.is_active(index) {
            return None;
        }
        let mut record = self.record_at(index)?;
        record.cold = self.cold.remove(index).unwrap_or_default();
        self.index.shift_remove(&record.id);
        self.ids[index] = None;
        self.block.clear(index);
        Some(record)
    }

    /// Occupied slots in ascending order.
    pub fn active_indices(&self) -> Vec<usize> {
        self.block
            .active
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| a.then_some(i))
            .collect()
    }

    /// Raw hot arrays.
    pub fn block(&self) -> &UnitBlock {
        &self.block
    }

    /// Cold data by slot.
    pub fn cold_at(&self, index: usize) -> Option<&ColdData> {
        self.cold.get(index)
    }

    /// Full snapshot of a slot.
    pub fn record_at(&self, index: usize) -> Option<UnitRecord> {
        let id = self.ids.get(index)?.as_ref()?;
        let b = &self.block;
        Some(UnitRecord {
            id: id.clone(),
            position: b.position(index),
            z: b.z[index],
            intended_move: b.intended_move(index),
            hp: b.hp[index],
            max_hp: b.max_hp[index],
            damage: b.damage[index],
            mass: b.mass[index],
            team: b.team_of(index),
            state: b.state_of(index),
            cold: self.cold.get(index).cloned().unwrap_or_default(),
        })
    }

    /// Set the position of a slot. Returns `false` for an inactive slot.
    pub fn set_position_at(&mut self, index: usize, position: Vec2) -> bool {
        if !self.block.is_active(index) {
            return false;
        }
        self.block.x[index] = position.x;
        self.block.y[index] = position.y;
        true
    }

    /// Set the hit points of a slot. Returns `false` for an inactive slot.
    pub fn set_hp_at(&mut self, index: usize, hp: f32) -> bool {
        if !self.block.is_active(index) {
            return false;
        }
        self.block.hp[index] = hp;
        true
    }

    /// Set the state of a slot. Returns `false` for an inactive slot.
    pub fn set_state_at(&mut self, index: usize, state: UnitState) -> bool {
        if !self.block.is_active(index) {
            return false;
        }
        self.block.state[index] = state.code();
        true
    }

    fn slot(&self, id: &UnitId) -> Option<usize> {
        self.index.get(id).copied()
    }

    fn with_slot(&mut self, id: &UnitId, f: impl FnOnce(&mut UnitBlock, usize)) -> bool {
        match self.slot(id) {
            Some(i) => {
                f(&mut self.block, i);
                true
            }
            None => false,
        }
    }
}

impl UnitQuery for UnitManager {
    fn index_of(&self, id: &UnitId) -> Option<usize> {
        self.slot(id)
    }

    fn id_at(&self, index: usize) -> Option<&UnitId> {
        self.ids.get(index)?.as_ref()
    }

    fn unit_ids(&self) -> Vec<UnitId> {
        self.ids.iter().flatten().cloned().collect()
    }

    fn unit_count(&self) -> usize {
        self.len()
    }

    fn position(&self, id: &UnitId) -> Option<Vec2> {
        self.slot(id).map(|i| self.block.position(i))
    }

    fn z(&self, id: &UnitId) -> Option<f32> {
        self.slot(id).map(|i| self.block.z[i])
    }

    fn intended_move(&self, id: &UnitId) -> Option<Vec2> {
        self.slot(id).map(|i| self.block.intended_move(i))
    }

    fn hp(&self, id: &UnitId) -> Option<f32> {
        self.slot(id).map(|i| self.block.hp[i])
    }

    fn max_hp(&self, id: &UnitId) -> Option<f32> {
        self.slot(id).map(|i| self.block.max_hp[i])
    }

    fn damage(&self, id: &UnitId) -> Option<f32> {
        self.slot(id).map(|i| self.block.damage[i])
    }

    fn mass(&self, id: &UnitId) -> Option<f32> {
        self.slot(id).map(|i| self.block.mass[i])
    }

    fn team(&self, id: &UnitId) -> Option<Team> {
        self.slot(id).map(|i| self.block.team_of(i))
    }

    fn state(&self, id: &UnitId) -> Option<UnitState> {
        self.slot(id).map(|i| self.block.state_of(i))
    }

    fn cold(&self, id: &UnitId) -> Option<&ColdData> {
        self.cold.get(self.slot(id)?)
    }

    fn record(&self, id: &UnitId) -> Option<UnitRecord> {
        self.record_at(self.slot(id)?)
    }
}

impl UnitWriter for UnitManager {
    fn add_unit(&mut self, record: UnitRecord) -> Result<usize, StoreError> {
        self.add(record)
    }

    fn remove_unit(&mut self, id: &UnitId) -> Option<UnitRecord> {
        let slot = self.slot(id)?;
        self.remove(slot)
    }

    fn set_position(&mut self, id: &UnitId, position: Vec2) -> bool {
        self.with_slot(id, |b, i| {
            b.x[i] = position.x;
            b.y[i] = position.y;
        })
    }

    fn set_z(&mut self, id: &UnitId, z: f32) -> bool {
        self.with_slot(id, |b, i| b.z[i] = z)
    }

    fn set_intended_move(&mut self, id: &UnitId, intended: Vec2) -> bool {
        self.with_slot(id, |b, i| {
            b.mx[i] = intended.x;
            b.my[i] = intended.y;
        })
    }

    fn set_hp(&mut self, id: &UnitId, hp: f32) -> bool {
        self.with_slot(id, |b, i| b.hp[i] = hp)
    }

    fn set_max_hp(&mut self, id: &UnitId, max_hp: f32) -> bool {
        self.with_slot(id, |b, i| b.max_hp[i] = max_hp)
    }

    fn set_damage(&mut self, id: &UnitId, damage: f32) -> bool {
        self.with_slot(id, |b, i| b.damage[i] = damage)
    }

    fn set_mass(&mut self, id: &UnitId, mass: f32) -> bool {
        self.with_slot(id, |b, i| b.mass[i] = mass)
    }

    fn set_team(&mut self, id: &UnitId, team: Team) -> bool {
        self.with_slot(id, |b, i| b.team[i] = team.code())
    }

    fn set_state(&mut self, id: &UnitId, state: UnitState) -> bool {
        self.with_slot(id, |b, i| b.state[i] = state.code())
    }

    fn cold_mut(&mut self, id: &UnitId) -> Option<&mut ColdData> {
        let slot = self.slot(id)?;
        self.cold.get_mut(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str) -> UnitRecord {
        UnitRecord::new(id, Team::Friendly, Vec2::new(1.0, 1.0))
    }

    #[test]
    fn add_assigns_lowest_free_slot() {
        let mut m = UnitManager::new(4);
        assert_eq!(m.add(unit("a")).unwrap(), 0);
        assert_eq!(m.add(unit("b")).unwrap(), 1);
        assert_eq!(m.add(unit("c")).unwrap(), 2);
        m.remove(1).unwrap();
        m.remove(0).unwrap();
        assert_eq!(m.add(unit("d")).unwrap(), 0);
        assert_eq!(m.add(unit("e")).unwrap(), 1);
        assert_eq!(m.active_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn rejected_adds_mutate_nothing() {
        let mut m = UnitManager::new(1);
        m.add(unit("a")).unwrap();

        assert_eq!(
            m.add(unit("b")),
            Err(StoreError::CapacityExceeded { capacity: 1 })
        );
        assert_eq!(
            m.add(unit("a")),
            Err(StoreError::DuplicateId { id: "a".into() })
        );
        assert_eq!(m.add(unit("")), Err(StoreError::EmptyId));

        assert_eq!(m.len(), 1);
        assert!(!m.contains(&"b".into()));
        assert_eq!(m.unit_ids(), vec![UnitId::from("a")]);
    }

    #[test]
    fn remove_returns_full_record() {
        let mut m = UnitManager::new(2);
        let r = unit("a").with_hp(42.0).with_tag("ai");
        m.add(r.clone()).unwrap();
        let out = m.remove(0).unwrap();
        assert_eq!(out, r);
        assert!(m.remove(0).is_none());
        assert_eq!(m.index_of(&"a".into()), None);
    }

    #[test]
    fn writer_ignores_unknown_ids() {
        let mut m = UnitManager::new(2);
        m.add(unit("a")).unwrap();
        let ghost = UnitId::from("ghost");
        assert!(!m.set_hp(&ghost, 5.0));
        assert!(!m.set_position(&ghost, Vec2::new(9.0, 9.0)));
        assert!(m.cold_mut(&ghost).is_none());
        assert_eq!(m.hp(&"a".into()), Some(100.0));
    }

    #[test]
    fn id_survives_slot_reuse() {
        let mut m = UnitManager::new(1);
        m.add(unit("a")).unwrap();
        m.remove_unit(&"a".into()).unwrap();
        m.add(unit("b")).unwrap();
        assert_eq!(m.id_at(0), Some(&UnitId::from("b")));
        assert_eq!(m.hp(&"a".into()), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn add_remove_keeps_maps_consistent(
                ops in prop::collection::vec((any::<bool>(), 0usize..8), 0..64),
            ) {
                let mut m = UnitManager::new(6);
                let mut next = 0u32;
                for (is_add, k) in ops {
                    if is_add {
                        let expected = m.block().first_free();
                        let result = m.add(unit(&format!("u{next}")));
                        next += 1;
                        match expected {
                            Some(slot) => prop_assert_eq!(result, Ok(slot)),
                            None => prop_assert!(result.is_err()),
                        }
                    } else {
                        m.remove(k);
                    }
                    let active = m.active_indices();
                    prop_assert_eq!(active.len(), m.len());
                    for i in active {
                        let id = m.id_at(i).cloned();
                        prop_assert!(id.is_some());
                        prop_assert_eq!(m.index_of(&id.unwrap()), Some(i));
                    }
                }
            }

            #[test]
            fn add_n_remove_n_empties(n in 0usize..16) {
                let mut m = UnitManager::new(16);
                for i in 0..n {
                    m.add(unit(&format!("u{i}"))).unwrap();
                }
                for i in 0..n {
                    prop_assert!(m.remove(i).is_some());
                }
                prop_assert_eq!(m.len(), 0);
                prop_assert!(m.active_indices().is_empty());
            }
        }
    }
}
