//! Timed status effects.
//!
//! Effects live in each unit's `effects` metadata list as
//! `{status, amount, until}` objects, written by the `status` executor.

use serde_json::Value;
use skirmish_core::{keys, QueuedCommand, RuleError};
use skirmish_rule::{Rule, RulePhase, TickContext};

/// Applies and expires status effects.
///
/// | status | per tick |
/// |--------|----------|
/// | `burn` | `damage {amount}` |
/// | `regen` | `heal {amount}` |
/// | `stun` | `stunned` flag set |
/// | `slow` | `slowed` flag set |
///
/// An effect is active while `tick < until`. When a unit carries lapsed
/// entries, or its flags disagree with its running effects, the rule
/// queues one `expire_effects` for it; the executor prunes the live list
/// so a `status` landing earlier in the same tick is kept.
#[derive(Debug, Default)]
pub struct StatusEffectRule;

impl StatusEffectRule {
    /// The rule.
    pub fn new() -> Self {
        Self
    }
}

fn status_of(entry: &Value) -> Option<&str> {
    entry.get("status")?.as_str()
}

fn until_of(entry: &Value) -> u64 {
    entry.get("until").and_then(Value::as_u64).unwrap_or(0)
}

fn amount_of(entry: &Value) -> f64 {
    entry
        .get("amount")
        .and_then(Value::as_f64)
        .filter(|a| a.is_finite() && *a > 0.0)
        .unwrap_or(0.0)
}

impl Rule for StatusEffectRule {
    fn name(&self) -> &str {
        "status_effects"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::StatusEffects
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        let tick = ctx.tick().0;
        let mut out = Vec::new();
        for unit in ctx.units() {
            if !unit.is_alive() {
                continue;
            }
            let entries = match unit.meta(keys::EFFECTS) {
                Some(Value::Array(entries)) => entries.as_slice(),
                _ => &[][..],
            };
            let (active, expired): (Vec<&Value>, Vec<&Value>) =
                entries.iter().partition(|e| tick < until_of(e));

            let mut stunned = false;
            let mut slowed = false;
            for entry in &active {
                let amount = amount_of(entry);
                match status_of(entry) {
                    Some("burn") if amount > 0.0 => out.push(
                        QueuedCommand::new("damage")
                            .unit(unit.id().clone())
                            .param("amount", amount),
                    ),
                    Some("regen") if amount > 0.0 => out.push(
                        QueuedCommand::new("heal")
                            .unit(unit.id().clone())
                            .param("amount", amount),
                    ),
                    Some("stun") => stunned = true,
                    Some("slow") => slowed = true,
                    _ => {}
                }
            }

            let flags_stale =
                unit.flag(keys::STUNNED) != stunned || unit.flag(keys::SLOWED) != slowed;
            if !expired.is_empty() || flags_stale {
                out.push(QueuedCommand::new("expire_effects").unit(unit.id().clone()));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ctx;
    use serde_json::json;
    use skirmish_core::UnitWriter;
    use skirmish_store::UnitManager;
    use skirmish_test_utils::{duel, projectiles};

    fn with_effects(effects: Value) -> UnitManager {
        let mut units = duel(3.0, 50.0, 10.0);
        units
            .cold_mut(&"friend".into())
            .unwrap()
            .meta
            .insert(keys::EFFECTS.into(), effects);
        units
    }

    #[test]
    fn burn_and_regen_tick() {
        let units = with_effects(json!([
            {"status": "burn", "amount": 2, "until": 5},
            {"status": "regen", "amount": 1, "until": 5}
        ]));
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 1);
        let cmds = StatusEffectRule::new().execute(&mut c).unwrap();
        let kinds: Vec<_> = cmds.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["damage", "heal"]);
        assert_eq!(cmds[0].f32_param("amount"), Some(2.0));
    }

    #[test]
    fn lapsed_effects_queue_an_expiry() {
        let units = with_effects(json!([
            {"status": "burn", "amount": 2, "until": 3},
            {"status": "slow", "amount": 0, "until": 9}
        ]));
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 3);
        let cmds = StatusEffectRule::new().execute(&mut c).unwrap();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, "expire_effects");
        assert_eq!(cmds[0].unit_id, Some("friend".into()));
        assert!(cmds[0].params.is_empty());
    }

    #[test]
    fn stale_flag_queues_an_expiry() {
        let mut units = duel(3.0, 50.0, 10.0);
        units
            .cold_mut(&"friend".into())
            .unwrap()
            .meta
            .insert(keys::STUNNED.into(), Value::Bool(true));
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 2);
        let cmds = StatusEffectRule::new().execute(&mut c).unwrap();
        let kinds: Vec<_> = cmds.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["expire_effects"]);
    }

    #[test]
    fn steady_state_emits_nothing() {
        let units = duel(3.0, 50.0, 10.0);
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 0);
        assert!(StatusEffectRule::new().execute(&mut c).unwrap().is_empty());
    }
}
