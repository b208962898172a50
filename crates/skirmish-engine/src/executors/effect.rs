//! Data-driven ability effects.

use std::f32::consts::TAU;

use serde_json::{json, Value};
use skirmish_core::{CommandError, QueuedCommand, Team, UnitId, Vec2};
use skirmish_rule::EffectDescriptor;

use super::subject;
use crate::registry::CommandExecutor;
use crate::transform::ExecContext;

/// `effect {effect, target?}`: expand one [`EffectDescriptor`] cast by the
/// subject into the commands that carry it out.
///
/// `target` defaults to the caster. The expansion runs in the next pass.
pub struct EffectExecutor;

impl CommandExecutor for EffectExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let caster = subject(cmd, ctx)?;
        let effect = parse_effect(cmd)?;
        let target = match cmd.unit_param("target") {
            Some(t) => {
                ctx.require_known(&t)?;
                t
            }
            None => caster.clone(),
        };
        let q = ctx.query();
        let from = q.position(caster).unwrap_or_default();
        let to = q.position(&target).unwrap_or_default();
        let team = q.team(caster).unwrap_or_default();

        let commands = expand(&effect, caster, &target, from, to, team, ctx.tuning().spawn_spacing);
        for c in commands {
            ctx.enqueue(c);
        }
        Ok(())
    }
}

fn parse_effect(cmd: &QueuedCommand) -> Result<EffectDescriptor, CommandError> {
    let raw = match cmd.params.get("effect") {
        None | Some(Value::Null) => {
            return Err(CommandError::MissingParam {
                kind: cmd.kind.clone(),
                param: "effect".to_string(),
            })
        }
        Some(v) => v.clone(),
    };
    serde_json::from_value(raw).map_err(|e| CommandError::InvalidParam {
        kind: cmd.kind.clone(),
        param: "effect".to_string(),
        reason: e.to_string(),
    })
}

fn expand(
    effect: &EffectDescriptor,
    caster: &UnitId,
    target: &UnitId,
    from: Vec2,
    to: Vec2,
    team: Team,
    spacing: f32,
) -> Vec<QueuedCommand> {
    match effect {
        EffectDescriptor::Damage { amount } => vec![QueuedCommand::new("damage")
            .unit(target.clone())
            .param("amount", json!(amount))
            .param("source", caster.as_str())],
        EffectDescriptor::Heal { amount } => vec![QueuedCommand::new("heal")
            .unit(target.clone())
            .param("amount", json!(amount))],
        EffectDescriptor::Aoe {
            radius,
            amount,
            friendly_fire,
        } => {
            let mut aoe = QueuedCommand::new("aoe")
                .param("x", json!(to.x))
                .param("y", json!(to.y))
                .param("radius", json!(radius))
                .param("amount", json!(amount))
                .param("source", caster.as_str());
            if !friendly_fire {
                aoe = aoe.param("team", team.to_string());
            }
            vec![aoe]
        }
        EffectDescriptor::Status {
            status,
            duration,
            amount,
        } => vec![QueuedCommand::new("status")
            .unit(target.clone())
            .param("status", status.as_str())
            .param("duration", *duration)
            .param("amount", json!(amount))],
        EffectDescriptor::Jump { duration, height } => {
            let mut jump = QueuedCommand::new("jump")
                .unit(caster.clone())
                .param("target_x", json!(to.x))
                .param("target_y", json!(to.y));
            if let Some(d) = duration {
                jump = jump.param("duration", *d);
            }
            if let Some(h) = height {
                jump = jump.param("height", json!(h));
            }
            vec![jump]
        }
        EffectDescriptor::Knockback { force } => {
            let dir = (to - from).normalized();
            let dir = if dir == Vec2::ZERO {
                Vec2::new(1.0, 0.0)
            } else {
                dir
            };
            let f = dir * *force;
            vec![QueuedCommand::new("force")
                .unit(target.clone())
                .param("fx", json!(f.x))
                .param("fy", json!(f.y))]
        }
        EffectDescriptor::Spawn { unit_type, count } => (0..*count)
            .map(|i| {
                let angle = TAU * i as f32 / *count as f32;
                let at = from + Vec2::new(angle.cos(), angle.sin()) * spacing;
                QueuedCommand::new("spawn")
                    .unit(caster.clone())
                    .param("unit_type", unit_type.as_str())
                    .param("x", json!(at.x))
                    .param("y", json!(at.y))
            })
            .collect(),
        EffectDescriptor::Projectile {
            speed,
            damage,
            lobbed,
            aoe_radius,
        } => {
            let mut shot = QueuedCommand::new("projectile")
                .unit(caster.clone())
                .param("x", json!(from.x))
                .param("y", json!(from.y))
                .param("damage", json!(damage));
            if *lobbed {
                let flight = (from.distance(to) / speed.max(f32::EPSILON)).ceil().max(1.0);
                shot = shot
                    .param("lobbed", true)
                    .param("target_x", json!(to.x))
                    .param("target_y", json!(to.y))
                    .param("duration", json!(flight))
                    .param("aoe_radius", json!(aoe_radius));
            } else {
                let v = (to - from).normalized() * *speed;
                shot = shot.param("vx", json!(v.x)).param("vy", json!(v.y));
            }
            vec![shot]
        }
    }
}
