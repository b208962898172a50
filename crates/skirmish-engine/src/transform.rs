//! The single mutation surface.
//!
//! Executors never see the stores directly. They get an [`ExecContext`]
//! wrapping a [`Transform`], which applies partial updates to units and
//! projectiles and hands out read access through [`UnitQuery`].

use skirmish_core::{
    merge_meta, CommandError, GameEvent, Meta, ProjectileId, QueuedCommand, StoreError, Team,
    TickId, UnitId, UnitQuery, UnitRecord, UnitState, UnitWriter, Vec2,
};
use skirmish_rule::Battlefield;
use skirmish_store::{ProjectileRecord, ProjectileStore, UnitManager};

use crate::config::CombatTuning;
use crate::factory::UnitFactory;

// ── UnitChanges ────────────────────────────────────────────────────

/// A partial unit update. Only the fields that are `Some` are written.
///
/// `meta` is merged key by key: defined values overwrite and `null`
/// deletes, the same rule the queue uses when folding `meta` commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnitChanges {
    /// New ground position.
    pub position: Option<Vec2>,
    /// New height.
    pub z: Option<f32>,
    /// New intended move.
    pub intended_move: Option<Vec2>,
    /// New hit points.
    pub hp: Option<f32>,
    /// New hit point ceiling.
    pub max_hp: Option<f32>,
    /// New strike damage.
    pub damage: Option<f32>,
    /// New mass.
    pub mass: Option<f32>,
    /// New team.
    pub team: Option<Team>,
    /// New lifecycle state.
    pub state: Option<UnitState>,
    /// Metadata patch.
    pub meta: Option<Meta>,
    /// New posture.
    pub posture: Option<String>,
    /// New intended target.
    pub intended_target: Option<UnitId>,
    /// Record an ability use: `(ability, tick)`.
    pub ability_used: Option<(String, u64)>,
}

impl UnitChanges {
    /// No changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position.
    pub fn position(mut self, p: Vec2) -> Self {
        self.position = Some(p);
        self
    }

    /// Set the height.
    pub fn z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    /// Set the intended move.
    pub fn intended_move(mut self, v: Vec2) -> Self {
        self.intended_move = Some(v);
        self
    }

    /// Set hit points.
    pub fn hp(mut self, hp: f32) -> Self {
        self.hp = Some(hp);
        self
    }

    /// Set the lifecycle state.
    pub fn state(mut self, state: UnitState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set one metadata key. `Value::Null` deletes it.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta
            .get_or_insert_with(Meta::new)
            .insert(key.into(), value.into());
        self
    }

    /// Merge a whole metadata patch.
    pub fn meta_patch(mut self, patch: Meta) -> Self {
        match &mut self.meta {
            Some(existing) => existing.extend(patch),
            None => self.meta = Some(patch),
        }
        self
    }

    /// Whether nothing would change.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Transform ──────────────────────────────────────────────────────

/// Write access to the stores for the duration of one command-processing
/// call.
pub struct Transform<'w> {
    units: &'w mut UnitManager,
    projectiles: &'w mut ProjectileStore,
    field: Battlefield,
}

impl<'w> Transform<'w> {
    /// Wrap the stores.
    pub fn new(
        units: &'w mut UnitManager,
        projectiles: &'w mut ProjectileStore,
        field: Battlefield,
    ) -> Self {
        Self {
            units,
            projectiles,
            field,
        }
    }

    /// Read access to units.
    pub fn query(&self) -> &dyn UnitQuery {
        &*self.units
    }

    /// Read access to projectiles.
    pub fn projectiles(&self) -> &ProjectileStore {
        self.projectiles
    }

    /// Field bounds.
    pub fn field(&self) -> Battlefield {
        self.field
    }

    /// Apply `changes` to a unit.
    ///
    /// Fails with [`CommandError::UnknownUnit`] without touching anything
    /// if the unit is not stored.
    pub fn update_unit(&mut self, id: &UnitId, changes: UnitChanges) -> Result<(), CommandError> {
        if !self.units.contains(id) {
            return Err(CommandError::UnknownUnit { id: id.clone() });
        }
        let u = &mut *self.units;
        if let Some(p) = changes.position {
            u.set_position(id, p);
        }
        if let Some(z) = changes.z {
            u.set_z(id, z);
        }
        if let Some(v) = changes.intended_move {
            u.set_intended_move(id, v);
        }
        if let Some(hp) = changes.hp {
            u.set_hp(id, hp);
        }
        if let Some(max_hp) = changes.max_hp {
            u.set_max_hp(id, max_hp);
        }
        if let Some(damage) = changes.damage {
            u.set_damage(id, damage);
        }
        if let Some(mass) = changes.mass {
            u.set_mass(id, mass);
        }
        if let Some(team) = changes.team {
            u.set_team(id, team);
        }
        if let Some(state) = changes.state {
            u.set_state(id, state);
        }
        if let Some(cold) = u.cold_mut(id) {
            if let Some(patch) = &changes.meta {
                merge_meta(&mut cold.meta, patch);
            }
            if let Some(posture) = changes.posture {
                cold.posture = Some(posture);
            }
            if let Some(target) = changes.intended_target {
                cold.intended_target = Some(target);
            }
            if let Some((ability, tick)) = changes.ability_used {
                cold.last_ability_tick.insert(ability, tick);
            }
        }
        Ok(())
    }

    /// Add a unit.
    pub fn add_unit(&mut self, record: UnitRecord) -> Result<usize, StoreError> {
        self.units.add_unit(record)
    }

    /// Remove a unit.
    pub fn remove_unit(&mut self, id: &UnitId) -> Option<UnitRecord> {
        self.units.remove_unit(id)
    }

    /// Add a projectile.
    pub fn add_projectile(&mut self, record: ProjectileRecord) -> Result<ProjectileId, StoreError> {
        self.projectiles.add(record)
    }

    /// Edit a projectile in place.
    pub fn update_projectile(
        &mut self,
        id: ProjectileId,
        edit: impl FnOnce(&mut ProjectileRecord),
    ) -> Result<(), CommandError> {
        let mut record = self
            .projectiles
            .get(id)
            .ok_or(CommandError::UnknownProjectile { id: id.0 })?;
        edit(&mut record);
        self.projectiles.replace(id, record);
        Ok(())
    }

    /// Remove a projectile.
    pub fn remove_projectile(&mut self, id: ProjectileId) -> Option<ProjectileRecord> {
        self.projectiles.remove(id)
    }
}

// ── ExecContext ────────────────────────────────────────────────────

/// Everything an executor may touch.
///
/// Commands enqueued here run in the next pass of the same
/// command-processing call; events are translated at the end of the
/// current pass.
pub struct ExecContext<'a> {
    transform: Transform<'a>,
    tick: TickId,
    tuning: &'a CombatTuning,
    factory: &'a dyn UnitFactory,
    enqueued: Vec<QueuedCommand>,
    events: Vec<GameEvent>,
}

impl<'a> ExecContext<'a> {
    /// Build a context for `tick`.
    pub fn new(
        transform: Transform<'a>,
        tick: TickId,
        tuning: &'a CombatTuning,
        factory: &'a dyn UnitFactory,
    ) -> Self {
        Self {
            transform,
            tick,
            tuning,
            factory,
            enqueued: Vec::new(),
            events: Vec::new(),
        }
    }

    /// The mutation surface.
    pub fn transform(&mut self) -> &mut Transform<'a> {
        &mut self.transform
    }

    /// Read access to units.
    pub fn query(&self) -> &dyn UnitQuery {
        self.transform.query()
    }

    /// Read access to projectiles.
    pub fn projectiles(&self) -> &ProjectileStore {
        self.transform.projectiles()
    }

    /// Field bounds.
    pub fn field(&self) -> Battlefield {
        self.transform.field()
    }

    /// Tick being processed.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Executor constants.
    pub fn tuning(&self) -> &CombatTuning {
        self.tuning
    }

    /// Unit templates.
    pub fn factory(&self) -> &dyn UnitFactory {
        self.factory
    }

    /// Queue a follow-up command for the next pass.
    pub fn enqueue(&mut self, command: QueuedCommand) {
        self.enqueued.push(command);
    }

    /// Raise an event, stamping the current tick if it has none.
    pub fn emit(&mut self, mut event: GameEvent) {
        event.stamp(self.tick);
        self.events.push(event);
    }

    /// Look a unit up, failing with [`CommandError::UnknownUnit`].
    pub fn require_known(&self, id: &UnitId) -> Result<(), CommandError> {
        if self.query().contains(id) {
            Ok(())
        } else {
            Err(CommandError::UnknownUnit { id: id.clone() })
        }
    }

    pub(crate) fn take_enqueued(&mut self) -> Vec<QueuedCommand> {
        std::mem::take(&mut self.enqueued)
    }

    pub(crate) fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
