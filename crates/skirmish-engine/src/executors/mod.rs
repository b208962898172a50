//! Standard command executors.
//!
//! | kind | params | effect |
//! |------|--------|--------|
//! | `move` | `dx, dy` | shift position, clamp to the field, state → Moving |
//! | `intend_move` | `dx, dy` | set the intended-move vector |
//! | `teleport` | `x, y, z?` | set position exactly |
//! | `force` | `fx, fy` | shift position by force / mass |
//! | `jump` | `target_x, target_y, duration?, height?` | start an airborne arc |
//! | `toss` | `dx, dy, duration?, height?` | jump the unit by an offset |
//! | `damage` | `amount, source?` | `hp = max(0, hp - amount)` |
//! | `heal` | `amount` | `hp = min(hp + amount, max_hp)` |
//! | `strike` | `target` | attack animation and a `damage` follow-up |
//! | `kill` | `source?` | hp → 0, state → Dead |
//! | `aoe` | `x, y, radius, amount, team?, source?` | `damage` every unit in radius |
//! | `status` | `status, duration, amount?` | add a timed status effect |
//! | `expire_effects` | | drop lapsed status effects, sync flags |
//! | `meta` | `meta` | merge metadata |
//! | `remove` | | drop the unit from the store |
//! | `spawn` | `unit_type, x, y, team?, id?` | add a unit from a template |
//! | `posture` | `posture?, target?` | set posture and intended target |
//! | `mark_ability` | `ability` | record the ability's last use |
//! | `effect` | `effect, target?` | expand an effect descriptor into commands |
//! | `projectile` | see [`ProjectileExecutor`] | launch a projectile |
//! | `projectile_update` | `projectile, ...` | edit a projectile |
//! | `projectile_remove` | `projectile` | drop a projectile |

mod combat;
mod effect;
mod lifecycle;
mod movement;
mod projectile;

pub use combat::{
    AoeExecutor, DamageExecutor, ExpireEffectsExecutor, HealExecutor, KillExecutor,
    StatusExecutor, StrikeExecutor,
};
pub use effect::EffectExecutor;
pub use lifecycle::{
    MarkAbilityExecutor, MetaExecutor, PostureExecutor, RemoveExecutor, SpawnExecutor,
};
pub use movement::{
    ForceExecutor, IntendMoveExecutor, JumpExecutor, MoveExecutor, TeleportExecutor,
    TossExecutor,
};
pub use projectile::{ProjectileExecutor, ProjectileRemoveExecutor, ProjectileUpdateExecutor};

use skirmish_core::{CommandError, ProjectileId, QueuedCommand, UnitId};

use crate::registry::CommandRegistry;
use crate::transform::ExecContext;

/// Install every standard executor.
pub fn register_standard(registry: &mut CommandRegistry) {
    registry.register("move", MoveExecutor);
    registry.register("intend_move", IntendMoveExecutor);
    registry.register("teleport", TeleportExecutor);
    registry.register("force", ForceExecutor);
    registry.register("jump", JumpExecutor);
    registry.register("toss", TossExecutor);
    registry.register("damage", DamageExecutor);
    registry.register("heal", HealExecutor);
    registry.register("strike", StrikeExecutor);
    registry.register("kill", KillExecutor);
    registry.register("aoe", AoeExecutor);
    registry.register("status", StatusExecutor);
    registry.register("expire_effects", ExpireEffectsExecutor);
    registry.register("meta", MetaExecutor);
    registry.register("remove", RemoveExecutor);
    registry.register("spawn", SpawnExecutor::default());
    registry.register("posture", PostureExecutor);
    registry.register("mark_ability", MarkAbilityExecutor);
    registry.register("effect", EffectExecutor);
    registry.register("projectile", ProjectileExecutor);
    registry.register("projectile_update", ProjectileUpdateExecutor);
    registry.register("projectile_remove", ProjectileRemoveExecutor);
}

// ── Param helpers ──────────────────────────────────────────────────

/// The command's unit, which must be stored.
fn subject<'c>(cmd: &'c QueuedCommand, ctx: &ExecContext<'_>) -> Result<&'c UnitId, CommandError> {
    let id = cmd.require_unit()?;
    ctx.require_known(id)?;
    Ok(id)
}

/// A finite, non-negative numeric param.
fn non_negative(cmd: &QueuedCommand, key: &str) -> Result<f32, CommandError> {
    let v = cmd.require_f32(key)?;
    if v < 0.0 {
        return Err(CommandError::InvalidParam {
            kind: cmd.kind.clone(),
            param: key.to_string(),
            reason: format!("must not be negative, got {v}"),
        });
    }
    Ok(v)
}

/// An optional finite, non-negative numeric param.
fn optional_non_negative(cmd: &QueuedCommand, key: &str) -> Result<Option<f32>, CommandError> {
    match cmd.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(_) => non_negative(cmd, key).map(Some),
    }
}

/// The `projectile` param as an id.
fn projectile_id(cmd: &QueuedCommand) -> Result<ProjectileId, CommandError> {
    match cmd.params.get("projectile") {
        None | Some(serde_json::Value::Null) => Err(CommandError::MissingParam {
            kind: cmd.kind.clone(),
            param: "projectile".to_string(),
        }),
        Some(v) => v
            .as_u64()
            .map(ProjectileId)
            .ok_or_else(|| CommandError::InvalidParam {
                kind: cmd.kind.clone(),
                param: "projectile".to_string(),
                reason: "expected a non-negative integer".to_string(),
            }),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A throwaway world for executor unit tests.

    use skirmish_core::{GameEvent, QueuedCommand, Team, TickId, UnitRecord, Vec2};
    use skirmish_rule::Battlefield;
    use skirmish_store::{ProjectileStore, UnitManager};

    use crate::config::CombatTuning;
    use crate::factory::TemplateFactory;
    use crate::registry::CommandExecutor;
    use crate::transform::{ExecContext, Transform};

    pub(crate) struct World {
        pub units: UnitManager,
        pub projectiles: ProjectileStore,
        pub tuning: CombatTuning,
        pub factory: TemplateFactory,
        pub tick: u64,
    }

    impl World {
        pub fn new() -> Self {
            let mut units = UnitManager::new(16);
            for (id, team, x) in [
                ("a", Team::Friendly, 5.0),
                ("b", Team::Hostile, 6.0),
                ("c", Team::Hostile, 9.0),
            ] {
                units
                    .add(
                        UnitRecord::new(id, team, Vec2::new(x, 5.0))
                            .with_hp(50.0)
                            .with_damage(10.0),
                    )
                    .unwrap();
            }
            Self {
                units,
                projectiles: ProjectileStore::new(4),
                tuning: CombatTuning::default(),
                factory: TemplateFactory::new(),
                tick: 0,
            }
        }

        /// Run one command; return the result and whatever it enqueued
        /// and emitted.
        pub fn run(
            &mut self,
            exec: &mut dyn CommandExecutor,
            cmd: QueuedCommand,
        ) -> (
            Result<(), skirmish_core::CommandError>,
            Vec<QueuedCommand>,
            Vec<GameEvent>,
        ) {
            let transform = Transform::new(
                &mut self.units,
                &mut self.projectiles,
                Battlefield::new(20.0, 20.0),
            );
            let mut ctx =
                ExecContext::new(transform, TickId(self.tick), &self.tuning, &self.factory);
            let result = exec.execute(&cmd, &mut ctx);
            let enqueued = ctx.take_enqueued();
            let events = ctx.take_events();
            (result, enqueued, events)
        }
    }
}
