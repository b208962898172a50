//! Positional executors: walking, shoving and jumping.

use serde_json::json;
use skirmish_core::{keys, CommandError, QueuedCommand, UnitState, Vec2};

use super::{optional_non_negative, subject};
use crate::registry::CommandExecutor;
use crate::transform::{ExecContext, UnitChanges};

/// `move {dx, dy}`.
///
/// Coalesced last-write-wins per unit by the queue, so at most one move
/// per unit reaches this executor in a pass. Dead units stay put.
pub struct MoveExecutor;

impl CommandExecutor for MoveExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let delta = Vec2::new(cmd.require_f32("dx")?, cmd.require_f32("dy")?);
        if !ctx.query().is_alive(id) {
            return Ok(());
        }
        let from = ctx.query().position(id).unwrap_or_default();
        let to = ctx.field().clamp(from + delta);
        ctx.transform().update_unit(
            id,
            UnitChanges::new().position(to).state(UnitState::Moving),
        )
    }
}

/// `intend_move {dx, dy}`.
pub struct IntendMoveExecutor;

impl CommandExecutor for IntendMoveExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let v = Vec2::new(cmd.require_f32("dx")?, cmd.require_f32("dy")?);
        ctx.transform()
            .update_unit(id, UnitChanges::new().intended_move(v))
    }
}

/// `teleport {x, y, z?}`. No clamping; dead units stay put.
pub struct TeleportExecutor;

impl CommandExecutor for TeleportExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let to = Vec2::new(cmd.require_f32("x")?, cmd.require_f32("y")?);
        if !ctx.query().is_alive(id) {
            return Ok(());
        }
        let mut changes = UnitChanges::new().position(to);
        if let Some(z) = cmd.f32_param("z") {
            changes = changes.z(z);
        }
        ctx.transform().update_unit(id, changes)
    }
}

/// `force {fx, fy}`: displacement is force divided by mass, clamped to
/// the field.
pub struct ForceExecutor;

impl CommandExecutor for ForceExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let force = Vec2::new(cmd.require_f32("fx")?, cmd.require_f32("fy")?);
        if !ctx.query().is_alive(id) {
            return Ok(());
        }
        let mass = ctx.query().mass(id).filter(|m| *m > 0.0).unwrap_or(1.0);
        let from = ctx.query().position(id).unwrap_or_default();
        let to = ctx.field().clamp(from + force * (1.0 / mass));
        ctx.transform()
            .update_unit(id, UnitChanges::new().position(to))
    }
}

/// `jump {target_x, target_y, duration?, height?}`.
///
/// Records the arc in metadata; the airborne rule flies it. Duration and
/// height fall back to the tuning defaults.
pub struct JumpExecutor;

impl CommandExecutor for JumpExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let target = Vec2::new(cmd.require_f32("target_x")?, cmd.require_f32("target_y")?);
        let duration = match optional_non_negative(cmd, "duration")? {
            Some(d) if d < 1.0 => {
                return Err(CommandError::InvalidParam {
                    kind: cmd.kind.clone(),
                    param: "duration".to_string(),
                    reason: format!("must be at least one tick, got {d}"),
                })
            }
            Some(d) => d.round() as u64,
            None => ctx.tuning().jump_duration,
        };
        let height = optional_non_negative(cmd, "height")?.unwrap_or(ctx.tuning().jump_height);
        if !ctx.query().is_alive(id) {
            return Err(CommandError::UnitDead { id: id.clone() });
        }

        let origin = ctx.query().position(id).unwrap_or_default();
        let target = ctx.field().clamp(target);
        let tick = ctx.tick().0;
        let changes = UnitChanges::new()
            .state(UnitState::Moving)
            .intended_move(Vec2::ZERO)
            .meta(keys::JUMPING, true)
            .meta(keys::JUMP_ORIGIN_X, json!(origin.x))
            .meta(keys::JUMP_ORIGIN_Y, json!(origin.y))
            .meta(keys::JUMP_TARGET_X, json!(target.x))
            .meta(keys::JUMP_TARGET_Y, json!(target.y))
            .meta(keys::JUMP_START, tick)
            .meta(keys::JUMP_DURATION, duration)
            .meta(keys::JUMP_HEIGHT, json!(height));
        ctx.transform().update_unit(id, changes)
    }
}

/// `toss {dx, dy, duration?, height?}`: a jump by an offset from where
/// the unit stands.
pub struct TossExecutor;

impl CommandExecutor for TossExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let delta = Vec2::new(cmd.require_f32("dx")?, cmd.require_f32("dy")?);
        if !ctx.query().is_alive(id) {
            return Err(CommandError::UnitDead { id: id.clone() });
        }
        let target = ctx.query().position(id).unwrap_or_default() + delta;
        let mut jump = QueuedCommand::new("jump")
            .unit(id.clone())
            .param("target_x", json!(target.x))
            .param("target_y", json!(target.y));
        for key in ["duration", "height"] {
            if let Some(v) = cmd.params.get(key) {
                jump = jump.param(key, v.clone());
            }
        }
        ctx.enqueue(jump);
        Ok(())
    }
}
