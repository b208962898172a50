//! Hot unit attributes as fixed-capacity parallel arrays.

use skirmish_core::{Team, UnitRecord, UnitState, Vec2};

/// Struct-of-arrays storage for the numeric unit attributes.
///
/// Every array has exactly `capacity` entries and is indexed by slot.
/// Inactive slots hold stale values; check [`UnitBlock::active`] before
/// trusting a slot. Arrays are allocated once and never resized.
#[derive(Clone, Debug)]
pub struct UnitBlock {
    /// Ground x.
    pub x: Vec<f32>,
    /// Ground y.
    pub y: Vec<f32>,
    /// Height above ground.
    pub z: Vec<f32>,
    /// Intended move x.
    pub mx: Vec<f32>,
    /// Intended move y.
    pub my: Vec<f32>,
    /// Current hit points.
    pub hp: Vec<f32>,
    /// Hit point ceiling.
    pub max_hp: Vec<f32>,
    /// Strike damage.
    pub damage: Vec<f32>,
    /// Mass.
    pub mass: Vec<f32>,
    /// Team code, see [`Team::code`].
    pub team: Vec<u8>,
    /// State code, see [`UnitState::code`].
    pub state: Vec<u8>,
    /// Occupancy bitmap.
    pub active: Vec<bool>,
}

impl UnitBlock {
    /// Allocate a block of `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
            z: vec![0.0; capacity],
            mx: vec![0.0; capacity],
            my: vec![0.0; capacity],
            hp: vec![0.0; capacity],
            max_hp: vec![0.0; capacity],
            damage: vec![0.0; capacity],
            mass: vec![0.0; capacity],
            team: vec![0; capacity],
            state: vec![0; capacity],
            active: vec![false; capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.active.len()
    }

    /// Lowest inactive slot.
    pub fn first_free(&self) -> Option<usize> {
        self.active.iter().position(|a| !a)
    }

    /// Whether `index` is an occupied slot.
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Whether `index` is occupied by a unit that is not dead.
    pub fn is_alive(&self, index: usize) -> bool {
        self.is_active(index) && !UnitState::code_is_dead(self.state[index])
    }

    /// Ground position of a slot.
    pub fn position(&self, index: usize) -> Vec2 {
        Vec2::new(self.x[index], self.y[index])
    }

    /// Intended move of a slot.
    pub fn intended_move(&self, index: usize) -> Vec2 {
        Vec2::new(self.mx[index], self.my[index])
    }

    /// Decoded team of a slot. Unknown codes read as neutral.
    pub fn team_of(&self, index: usize) -> Team {
        Team::from_code(self.team[index]).unwrap_or_default()
    }

    /// Decoded state of a slot. Unknown codes read as idle.
    pub fn state_of(&self, index: usize) -> UnitState {
        UnitState::from_code(self.state[index]).unwrap_or_default()
    }

    pub(crate) fn write(&mut self, index: usize, record: &UnitRecord) {
        self.x[index] = record.position.x;
        self.y[index] = record.position.y;
        self.z[index] = record.z;
        self.mx[index] = record.intended_move.x;
        self.my[index] = record.intended_move.y;
        self.hp[index] = record.hp;
        self.max_hp[index] = record.max_hp;
        self.damage[index] = record.damage;
        self.mass[index] = record.mass;
        self.team[index] = record.team.code();
        self.state[index] = record.state.code();
        self.active[index] = true;
    }

    pub(crate) fn clear(&mut self, index: usize) {
        self.x[index] = 0.0;
        self.y[index] = 0.0;
        self.z[index] = 0.0;
        self.mx[index] = 0.0;
        self.my[index] = 0.0;
        self.hp[index] = 0.0;
        self.max_hp[index] = 0.0;
        self.damage[index] = 0.0;
        self.mass[index] = 0.0;
        self.team[index] = 0;
        self.state[index] = 0;
        self.active[index] = false;
    }
}
