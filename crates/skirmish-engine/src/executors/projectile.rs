//! Projectile executors.

use skirmish_core::{CommandError, QueuedCommand, Team, Vec2};
use skirmish_store::ProjectileRecord;

use super::{non_negative, optional_non_negative, projectile_id};
use crate::registry::CommandExecutor;
use crate::transform::ExecContext;

/// `projectile {...}`: launch a projectile.
///
/// Common params: `damage`, `team?`, `radius?`, and `x, y` (default: the
/// firing unit's position). Bullets take `vx, vy`. Bombs set
/// `lobbed: true` and take `target_x, target_y, duration, aoe_radius?`.
/// The team defaults to the firing unit's.
pub struct ProjectileExecutor;

impl CommandExecutor for ProjectileExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        if let Some(source) = &cmd.unit_id {
            ctx.require_known(source)?;
        }
        let q = ctx.query();
        let fired_from = cmd.unit_id.as_ref().and_then(|u| q.position(u));
        let position = match (cmd.f32_param("x"), cmd.f32_param("y"), fired_from) {
            (Some(x), Some(y), _) => Vec2::new(x, y),
            (_, _, Some(p)) => p,
            _ => Vec2::new(cmd.require_f32("x")?, cmd.require_f32("y")?),
        };
        let team = match cmd.str_param("team") {
            Some(name) => Team::parse(name).ok_or_else(|| CommandError::InvalidParam {
                kind: cmd.kind.clone(),
                param: "team".to_string(),
                reason: format!("unknown team '{name}'"),
            })?,
            None => cmd
                .unit_id
                .as_ref()
                .and_then(|u| q.team(u))
                .unwrap_or_default(),
        };
        let damage = non_negative(cmd, "damage")?;

        let mut record = if cmd.bool_param("lobbed").unwrap_or(false) {
            let target = Vec2::new(cmd.require_f32("target_x")?, cmd.require_f32("target_y")?);
            let duration = non_negative(cmd, "duration")?.max(1.0);
            let mut bomb = ProjectileRecord::bomb(position, target, duration, team, damage);
            if let Some(r) = optional_non_negative(cmd, "aoe_radius")? {
                bomb.aoe_radius = r;
            }
            bomb
        } else {
            let velocity = Vec2::new(cmd.require_f32("vx")?, cmd.require_f32("vy")?);
            ProjectileRecord::bullet(position, velocity, team, damage)
        };
        if let Some(r) = optional_non_negative(cmd, "radius")? {
            record.radius = r;
        }
        record.source = cmd.unit_id.clone();
        ctx.transform().add_projectile(record)?;
        Ok(())
    }
}

/// `projectile_update {projectile, x?, y?, z?, vx?, vy?, progress?}`.
pub struct ProjectileUpdateExecutor;

impl CommandExecutor for ProjectileUpdateExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = projectile_id(cmd)?;
        let x = cmd.f32_param("x");
        let y = cmd.f32_param("y");
        let z = cmd.f32_param("z");
        let vx = cmd.f32_param("vx");
        let vy = cmd.f32_param("vy");
        let progress = cmd.f32_param("progress");
        ctx.transform().update_projectile(id, |p| {
            if let Some(x) = x {
                p.position.x = x;
            }
            if let Some(y) = y {
                p.position.y = y;
            }
            if let Some(z) = z {
                p.z = z;
            }
            if let Some(vx) = vx {
                p.velocity.x = vx;
            }
            if let Some(vy) = vy {
                p.velocity.y = vy;
            }
            if let Some(progress) = progress {
                p.progress = progress.clamp(0.0, 1.0);
            }
        })
    }
}

/// `projectile_remove {projectile}`.
pub struct ProjectileRemoveExecutor;

impl CommandExecutor for ProjectileRemoveExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = projectile_id(cmd)?;
        ctx.transform()
            .remove_projectile(id)
            .map(|_| ())
            .ok_or(CommandError::UnknownProjectile { id: id.0 })
    }
}
