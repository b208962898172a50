//! Hit point and status executors.

use serde_json::{json, Value};
use skirmish_core::{
    keys, CommandError, GameEvent, QueuedCommand, Team, UnitId, UnitState, Vec2,
};

use super::{non_negative, subject};
use crate::registry::CommandExecutor;
use crate::transform::{ExecContext, UnitChanges};

/// `damage {amount, source?}`.
///
/// `hp' = max(0, hp - amount)`; reaching zero also sets `Dead`. Raises a
/// `damaged` event, plus `unit_died` when the hit was fatal. Dead units
/// take no further damage.
pub struct DamageExecutor;

impl CommandExecutor for DamageExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let amount = non_negative(cmd, "amount")?;
        if !ctx.query().is_alive(id) {
            return Ok(());
        }
        let hp = ctx.query().hp(id).unwrap_or(0.0);
        let new_hp = (hp - amount).max(0.0);
        let mut changes = UnitChanges::new().hp(new_hp);
        if new_hp == 0.0 {
            changes = changes.state(UnitState::Dead);
        }
        ctx.transform().update_unit(id, changes)?;

        let source = cmd.unit_param("source");
        let mut damaged = GameEvent::new("damaged")
            .on_unit(id.clone())
            .meta("amount", json!(amount))
            .meta("hp", json!(new_hp));
        damaged.source = source.clone();
        ctx.emit(damaged);
        if new_hp == 0.0 {
            let mut died = GameEvent::new("unit_died").on_unit(id.clone());
            died.source = source;
            ctx.emit(died);
        }
        Ok(())
    }
}

/// `heal {amount}`: `hp' = min(hp + amount, max_hp)`. Dead units are not
/// healed.
pub struct HealExecutor;

impl CommandExecutor for HealExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let amount = non_negative(cmd, "amount")?;
        if !ctx.query().is_alive(id) {
            return Ok(());
        }
        let hp = ctx.query().hp(id).unwrap_or(0.0);
        let max_hp = ctx.query().max_hp(id).unwrap_or(hp);
        ctx.transform()
            .update_unit(id, UnitChanges::new().hp((hp + amount).min(max_hp)))
    }
}

/// `strike {target}`: the subject attacks `target`.
///
/// Puts the attacker into `Attacking` until `tick + attack_ticks` and
/// queues a `damage` on the target for the attacker's damage stat.
pub struct StrikeExecutor;

impl CommandExecutor for StrikeExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let attacker = subject(cmd, ctx)?;
        let target = UnitId::from(cmd.require_str("target")?);
        ctx.require_known(&target)?;
        if !ctx.query().is_alive(attacker) {
            return Err(CommandError::UnitDead {
                id: attacker.clone(),
            });
        }
        let damage = ctx.query().damage(attacker).unwrap_or(0.0).max(0.0);
        let until = ctx.tick().0.saturating_add(ctx.tuning().attack_ticks);
        let changes = UnitChanges {
            intended_target: Some(target.clone()),
            ..UnitChanges::new()
                .state(UnitState::Attacking)
                .meta(keys::ATTACK_END_TICK, until)
        };
        ctx.transform().update_unit(attacker, changes)?;
        ctx.enqueue(
            QueuedCommand::new("damage")
                .unit(target)
                .param("amount", json!(damage))
                .param("source", attacker.as_str()),
        );
        Ok(())
    }
}

/// `kill {source?}`: hp → 0, state → `Dead`, raises `unit_died`.
/// Killing a dead unit does nothing.
pub struct KillExecutor;

impl CommandExecutor for KillExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        if ctx.query().state(id) == Some(UnitState::Dead) {
            return Ok(());
        }
        ctx.transform()
            .update_unit(id, UnitChanges::new().hp(0.0).state(UnitState::Dead))?;
        let mut died = GameEvent::new("unit_died").on_unit(id.clone());
        died.source = cmd.unit_param("source");
        ctx.emit(died);
        Ok(())
    }
}

/// `aoe {x, y, radius, amount, team?, source?}`.
///
/// Queues a `damage` for every living unit within `radius` of `(x, y)`,
/// in slot order. Units on `team`, when given, are spared.
pub struct AoeExecutor;

impl CommandExecutor for AoeExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let center = Vec2::new(cmd.require_f32("x")?, cmd.require_f32("y")?);
        let radius = non_negative(cmd, "radius")?;
        let amount = non_negative(cmd, "amount")?;
        let spared = match cmd.str_param("team") {
            Some(name) => Some(Team::parse(name).ok_or_else(|| CommandError::InvalidParam {
                kind: cmd.kind.clone(),
                param: "team".to_string(),
                reason: format!("unknown team '{name}'"),
            })?),
            None => None,
        };
        let q = ctx.query();
        let hits: Vec<UnitId> = q
            .unit_ids()
            .into_iter()
            .filter(|id| q.is_alive(id))
            .filter(|id| spared.is_none_or(|t| q.team(id) != Some(t)))
            .filter(|id| {
                q.position(id)
                    .is_some_and(|p| p.distance_squared(center) <= radius * radius)
            })
            .collect();
        for id in hits {
            let mut damage = QueuedCommand::new("damage")
                .unit(id)
                .param("amount", json!(amount));
            if let Some(source) = cmd.str_param("source") {
                damage = damage.param("source", source);
            }
            ctx.enqueue(damage);
        }
        Ok(())
    }
}

/// `status {status, duration, amount?}`.
///
/// Appends `{status, amount, until}` to the unit's `effects` list,
/// replacing any running effect of the same name.
pub struct StatusExecutor;

impl CommandExecutor for StatusExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let status = cmd.require_str("status")?;
        let duration = non_negative(cmd, "duration")?.round() as u64;
        let amount = cmd.f32_param("amount").unwrap_or(0.0);
        if !ctx.query().is_alive(id) {
            return Ok(());
        }
        let mut effects: Vec<Value> = ctx
            .query()
            .cold(id)
            .and_then(|c| c.meta.get(keys::EFFECTS))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        effects.retain(|e| e.get("status").and_then(Value::as_str) != Some(status));
        effects.push(json!({
            "status": status,
            "amount": amount,
            "until": ctx.tick().0.saturating_add(duration),
        }));
        ctx.transform()
            .update_unit(id, UnitChanges::new().meta(keys::EFFECTS, effects))
    }
}

/// `expire_effects`: drop entries with `until <= tick` from the unit's
/// live `effects` list and bring the `stunned` and `slowed` flags in line
/// with what remains.
///
/// Reads the list at dispatch time, so a `status` applied earlier in the
/// same tick survives.
pub struct ExpireEffectsExecutor;

impl CommandExecutor for ExpireEffectsExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let tick = ctx.tick().0;
        let Some(cold) = ctx.query().cold(id) else {
            return Ok(());
        };
        let effects: Vec<Value> = cold
            .meta
            .get(keys::EFFECTS)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let before = effects.len();
        let active: Vec<Value> = effects
            .into_iter()
            .filter(|e| e.get("until").and_then(Value::as_u64).unwrap_or(0) > tick)
            .collect();
        let running = |name: &str| {
            active
                .iter()
                .any(|e| e.get("status").and_then(Value::as_str) == Some(name))
        };
        let stunned = running("stun");
        let slowed = running("slow");

        let mut changes = UnitChanges::new();
        if active.len() != before {
            changes = if active.is_empty() {
                changes.meta(keys::EFFECTS, Value::Null)
            } else {
                changes.meta(keys::EFFECTS, active)
            };
        }
        for (key, on) in [(keys::STUNNED, stunned), (keys::SLOWED, slowed)] {
            if cold.flag(key) != on {
                changes = changes.meta(key, if on { Value::Bool(true) } else { Value::Null });
            }
        }
        ctx.transform().update_unit(id, changes)
    }
}
