//! Read and write capabilities over unit storage.
//!
//! Rules only ever see a [`UnitQuery`]. The mutable [`UnitWriter`] is
//! handed out exclusively to the command layer, so every state change
//! flows through a queued command.

use crate::error::StoreError;
use crate::id::UnitId;
use crate::unit::{ColdData, Team, UnitRecord, UnitState, Vec2};

/// Read-only access to units by id.
///
/// Every getter returns `None` for an id that is not stored.
pub trait UnitQuery {
    /// Slot currently holding `id`.
    fn index_of(&self, id: &UnitId) -> Option<usize>;

    /// Id stored in slot `index`, if that slot is active.
    fn id_at(&self, index: usize) -> Option<&UnitId>;

    /// Ids of all stored units, in ascending slot order.
    fn unit_ids(&self) -> Vec<UnitId>;

    /// Number of stored units.
    fn unit_count(&self) -> usize;

    /// Ground position.
    fn position(&self, id: &UnitId) -> Option<Vec2>;

    /// Height above ground.
    fn z(&self, id: &UnitId) -> Option<f32>;

    /// Pending intended movement.
    fn intended_move(&self, id: &UnitId) -> Option<Vec2>;

    /// Current hit points.
    fn hp(&self, id: &UnitId) -> Option<f32>;

    /// Hit point ceiling.
    fn max_hp(&self, id: &UnitId) -> Option<f32>;

    /// Strike damage.
    fn damage(&self, id: &UnitId) -> Option<f32>;

    /// Mass.
    fn mass(&self, id: &UnitId) -> Option<f32>;

    /// Allegiance.
    fn team(&self, id: &UnitId) -> Option<Team>;

    /// Lifecycle state.
    fn state(&self, id: &UnitId) -> Option<UnitState>;

    /// Cold attributes.
    fn cold(&self, id: &UnitId) -> Option<&ColdData>;

    /// Whether `id` is stored.
    fn contains(&self, id: &UnitId) -> bool {
        self.index_of(id).is_some()
    }

    /// Whether the unit is stored and not dead.
    fn is_alive(&self, id: &UnitId) -> bool {
        matches!(self.state(id), Some(s) if s != UnitState::Dead)
    }

    /// Snapshot of every attribute of a unit.
    fn record(&self, id: &UnitId) -> Option<UnitRecord> {
        Some(UnitRecord {
            id: id.clone(),
            position: self.position(id)?,
            z: self.z(id)?,
            intended_move: self.intended_move(id)?,
            hp: self.hp(id)?,
            max_hp: self.max_hp(id)?,
            damage: self.damage(id)?,
            mass: self.mass(id)?,
            team: self.team(id)?,
            state: self.state(id)?,
            cold: self.cold(id)?.clone(),
        })
    }
}

/// Mutable access to units by id.
///
/// Setters return `false` and change nothing when the id is unknown.
pub trait UnitWriter: UnitQuery {
    /// Store a new unit and return its slot.
    fn add_unit(&mut self, record: UnitRecord) -> Result<usize, StoreError>;

    /// Remove a unit, returning what was stored.
    fn remove_unit(&mut self, id: &UnitId) -> Option<UnitRecord>;

    /// Set ground position.
    fn set_position(&mut self, id: &UnitId, position: Vec2) -> bool;

    /// Set height above ground.
    fn set_z(&mut self, id: &UnitId, z: f32) -> bool;

    /// Set intended movement.
    fn set_intended_move(&mut self, id: &UnitId, intended: Vec2) -> bool;

    /// Set current hit points.
    fn set_hp(&mut self, id: &UnitId, hp: f32) -> bool;

    /// Set hit point ceiling.
    fn set_max_hp(&mut self, id: &UnitId, max_hp: f32) -> bool;

    /// Set strike damage.
    fn set_damage(&mut self, id: &UnitId, damage: f32) -> bool;

    /// Set mass.
    fn set_mass(&mut self, id: &UnitId, mass: f32) -> bool;

    /// Set allegiance.
    fn set_team(&mut self, id: &UnitId, team: Team) -> bool;

    /// Set lifecycle state.
    fn set_state(&mut self, id: &UnitId, state: UnitState) -> bool;

    /// Mutable cold attributes.
    fn cold_mut(&mut self, id: &UnitId) -> Option<&mut ColdData>;
}
