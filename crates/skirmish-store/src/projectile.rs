//! Projectile storage, laid out like the unit store.

use indexmap::IndexMap;
use skirmish_core::{ProjectileId, ProjectileKind, StoreError, Team, UnitId, Vec2};

/// Everything about one projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileRecord {
    /// Current position.
    pub position: Vec2,
    /// Velocity in tiles per tick (bullets).
    pub velocity: Vec2,
    /// Height above ground (bombs).
    pub z: f32,
    /// Hit radius.
    pub radius: f32,
    /// Damage on hit.
    pub damage: f32,
    /// Team that fired it.
    pub team: Team,
    /// Flight model.
    pub kind: ProjectileKind,
    /// Launch point (bombs).
    pub origin: Vec2,
    /// Landing point (bombs).
    pub target: Vec2,
    /// Fraction of the arc travelled, `0..=1`.
    pub progress: f32,
    /// Flight time in ticks (bombs).
    pub duration: f32,
    /// Unit that fired it.
    pub source: Option<UnitId>,
    /// Explosion radius on landing (bombs).
    pub aoe_radius: f32,
}

impl ProjectileRecord {
    /// A straight-flying bullet.
    pub fn bullet(position: Vec2, velocity: Vec2, team: Team, damage: f32) -> Self {
        Self {
            position,
            velocity,
            z: 0.0,
            radius: 0.5,
            damage,
            team,
            kind: ProjectileKind::Bullet,
            origin: position,
            target: position,
            progress: 0.0,
            duration: 0.0,
            source: None,
            aoe_radius: 0.0,
        }
    }

    /// A bomb lobbed from `origin` to land on `target` after `duration` ticks.
    pub fn bomb(origin: Vec2, target: Vec2, duration: f32, team: Team, damage: f32) -> Self {
        Self {
            position: origin,
            velocity: Vec2::ZERO,
            z: 0.0,
            radius: 0.5,
            damage,
            team,
            kind: ProjectileKind::Bomb,
            origin,
            target,
            progress: 0.0,
            duration,
            source: None,
            aoe_radius: 1.5,
        }
    }
}

/// Hot projectile arrays.
#[derive(Clone, Debug)]
pub struct ProjectileBlock {
    /// Position x.
    pub x: Vec<f32>,
    /// Position y.
    pub y: Vec<f32>,
    /// Velocity x.
    pub vx: Vec<f32>,
    /// Velocity y.
    pub vy: Vec<f32>,
    /// Height.
    pub z: Vec<f32>,
    /// Hit radius.
    pub radius: Vec<f32>,
    /// Damage.
    pub damage: Vec<f32>,
    /// Team code.
    pub team: Vec<u8>,
    /// Kind code.
    pub kind: Vec<u8>,
    /// Launch x.
    pub origin_x: Vec<f32>,
    /// Launch y.
    pub origin_y: Vec<f32>,
    /// Landing x.
    pub target_x: Vec<f32>,
    /// Landing y.
    pub target_y: Vec<f32>,
    /// Arc progress.
    pub progress: Vec<f32>,
    /// Flight time.
    pub duration: Vec<f32>,
    /// Occupancy bitmap.
    pub active: Vec<bool>,
}

impl ProjectileBlock {
    fn new(capacity: usize) -> Self {
        Self {
            x: vec![0.0; capacity],
            y: vec![0.0; capacity],
            vx: vec![0.0; capacity],
            vy: vec![0.0; capacity],
            z: vec![0.0; capacity],
            radius: vec![0.0; capacity],
            damage: vec![0.0; capacity],
            team: vec![0; capacity],
            kind: vec![0; capacity],
            origin_x: vec![0.0; capacity],
            origin_y: vec![0.0; capacity],
            target_x: vec![0.0; capacity],
            target_y: vec![0.0; capacity],
            progress: vec![0.0; capacity],
            duration: vec![0.0; capacity],
            active: vec![false; capacity],
        }
    }

    fn write(&mut self, i: usize, r: &ProjectileRecord) {
        self.x[i] = r.position.x;
        self.y[i] = r.position.y;
        self.vx[i] = r.velocity.x;
        self.vy[i] = r.velocity.y;
        self.z[i] = r.z;
        self.radius[i] = r.radius;
        self.damage[i] = r.damage;
        self.team[i] = r.team.code();
        self.kind[i] = r.kind.code();
        self.origin_x[i] = r.origin.x;
        self.origin_y[i] = r.origin.y;
        self.target_x[i] = r.target.x;
        self.target_y[i] = r.target.y;
        self.progress[i] = r.progress;
        self.duration[i] = r.duration;
        self.active[i] = true;
    }
}

#[derive(Clone, Debug, Default)]
struct ProjectileCold {
    source: Option<UnitId>,
    aoe_radius: f32,
}

/// Fixed-capacity projectile storage with monotonic ids.
#[derive(Clone, Debug)]
pub struct ProjectileStore {
    block: ProjectileBlock,
    cold: IndexMap<usize, ProjectileCold>,
    ids: Vec<Option<ProjectileId>>,
    index: IndexMap<ProjectileId, usize>,
    next_id: u64,
}

impl ProjectileStore {
    /// A store with room for `capacity` projectiles.
    pub fn new(capacity: usize) -> Self {
        Self {
            block: ProjectileBlock::new(capacity),
            cold: IndexMap::new(),
            ids: vec![None; capacity],
            index: IndexMap::new(),
            next_id: 0,
        }
    }

    /// Fixed capacity.
    pub fn capacity(&self) -> usize {
        self.block.active.len()
    }

    /// Number of live projectiles.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether there are no live projectiles.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Raw hot arrays.
    pub fn block(&self) -> &ProjectileBlock {
        &self.block
    }

    /// Store a projectile in the lowest free slot and allocate its id.
    pub fn add(&mut self, record: ProjectileRecord) -> Result<ProjectileId, StoreError> {
        let slot = self
            .block
            .active
            .iter()
            .position(|a| !a)
            .ok_or(StoreError::CapacityExceeded {
                capacity: self.capacity(),
            })?;
        let id = ProjectileId(self.next_id);
        self.next_id += 1;

        self.block.write(slot, &record);
        self.cold.insert(
            slot,
            ProjectileCold {
                source: record.source,
                aoe_radius: record.aoe_radius,
            },
        );
        self.ids[slot] = Some(id);
        self.index.insert(id, slot);
        Ok(id)
    }

    /// Remove a projectile.
    pub fn remove(&mut self, id: ProjectileId) -> Option<ProjectileRecord> {
        let slot = self.index.shift_remove(&id)?;
        let record = self.record_at(slot);
        self.cold.shift_remove(&slot);
        self.ids[slot] = None;
        self.block.active[slot] = false;
        record
    }

    /// Snapshot a projectile.
    pub fn get(&self, id: ProjectileId) -> Option<ProjectileRecord> {
        self.record_at(*self.index.get(&id)?)
    }

    /// Overwrite a projectile's attributes, keeping its id and slot.
    pub fn replace(&mut self, id: ProjectileId, record: ProjectileRecord) -> bool {
        let Some(&slot) = self.index.get(&id) else {
            return false;
        };
        self.block.write(slot, &record);
        self.cold.insert(
            slot,
            ProjectileCold {
                source: record.source,
                aoe_radius: record.aoe_radius,
            },
        );
        true
    }

    /// Slot of a projectile.
    pub fn index_of(&self, id: ProjectileId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Live projectile ids in ascending slot order.
    pub fn ids(&self) -> Vec<ProjectileId> {
        self.ids.iter().flatten().copied().collect()
    }

    fn record_at(&self, i: usize) -> Option<ProjectileRecord> {
        if !self.block.active.get(i).copied().unwrap_or(false) {
            return None;
        }
        let b = &self.block;
        let cold = self.cold.get(&i).cloned().unwrap_or_default();
        Some(ProjectileRecord {
            position: Vec2::new(b.x[i], b.y[i]),
            velocity: Vec2::new(b.vx[i], b.vy[i]),
            z: b.z[i],
            radius: b.radius[i],
            damage: b.damage[i],
            team: Team::from_code(b.team[i]).unwrap_or_default(),
            kind: ProjectileKind::from_code(b.kind[i]).unwrap_or_default(),
            origin: Vec2::new(b.origin_x[i], b.origin_y[i]),
            target: Vec2::new(b.target_x[i], b.target_y[i]),
            progress: b.progress[i],
            duration: b.duration[i],
            source: cold.source,
            aoe_radius: cold.aoe_radius,
        })
    }
}
