//! Data-driven abilities.

use serde_json::Value;
use skirmish_core::{keys, QueuedCommand, RuleError};
use skirmish_rule::{AbilityBook, CompiledAbility, Rule, RulePhase, TargetSelector, TickContext};
use skirmish_store::{batch, UnitProxy};
use tracing::trace;

/// Fires abilities from an [`AbilityBook`].
///
/// For each living unit that is neither stunned nor airborne, the unit's
/// abilities are tried in list order. The first one that is off cooldown,
/// has a target within range and whose trigger holds is used: the rule
/// emits `mark_ability` plus one `effect` command per effect descriptor.
/// At most one ability fires per unit per tick.
#[derive(Debug, Default)]
pub struct AbilityRule {
    book: AbilityBook,
}

impl AbilityRule {
    /// A rule using `book`.
    pub fn new(book: AbilityBook) -> Self {
        Self { book }
    }

    /// The ability book.
    pub fn book(&self) -> &AbilityBook {
        &self.book
    }

    /// The ability book, for adding abilities or swapping triggers.
    pub fn book_mut(&mut self) -> &mut AbilityBook {
        &mut self.book
    }
}

fn resolve_target<'a>(
    ctx: &TickContext<'a>,
    caster: &UnitProxy<'a>,
    ability: &CompiledAbility,
) -> Option<UnitProxy<'a>> {
    let index = caster.index()?;
    let block = ctx.units_block();
    let query = ctx.query();
    let target = match ability.target {
        TargetSelector::Caster => return Some(*caster),
        TargetSelector::NearestEnemy => batch::nearest_enemy(block, index)
            .and_then(|j| query.id_at(j))
            .and_then(|id| ctx.unit(id)),
        TargetSelector::NearestAlly => batch::nearest_ally(block, index)
            .and_then(|j| query.id_at(j))
            .and_then(|id| ctx.unit(id)),
        TargetSelector::WeakestEnemy => ctx
            .units_in_radius(caster.position(), ability.range)
            .into_iter()
            .filter(|u| u.is_enemy_of(caster))
            .reduce(|best, u| if u.hp() < best.hp() { u } else { best }),
    }?;
    (caster.distance_to(&target) <= ability.range).then_some(target)
}

impl Rule for AbilityRule {
    fn name(&self) -> &str {
        "abilities"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Abilities
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        if self.book.is_empty() {
            return Ok(Vec::new());
        }
        let tick = ctx.tick().0;
        let mut out = Vec::new();
        for caster in ctx.units() {
            if !caster.is_alive() || caster.flag(keys::STUNNED) || caster.flag(keys::JUMPING) {
                continue;
            }
            let Some(cold) = caster.cold() else {
                continue;
            };
            for name in &cold.abilities {
                let Some(ability) = self.book.get(name) else {
                    trace!(unit = %caster.id(), ability = %name, "unknown ability");
                    continue;
                };
                if !ability.ready(cold.last_ability_tick.get(name).copied(), tick) {
                    continue;
                }
                let Some(target) = resolve_target(ctx, &caster, ability) else {
                    continue;
                };
                if !(ability.trigger)(&caster, &target, ctx) {
                    continue;
                }

                out.push(
                    QueuedCommand::new("mark_ability")
                        .unit(caster.id().clone())
                        .param("ability", name.as_str()),
                );
                for effect in &ability.effects {
                    let effect = serde_json::to_value(effect).map_err(|e| {
                        RuleError::ExecutionFailed {
                            reason: format!("ability '{name}': {e}"),
                        }
                    })?;
                    out.push(
                        QueuedCommand::new("effect")
                            .unit(caster.id().clone())
                            .param("effect", effect)
                            .param("target", Value::from(target.id().as_str())),
                    );
                }
                break;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ctx;
    use skirmish_core::{Team, UnitId, UnitRecord, UnitWriter, Vec2};
    use skirmish_store::UnitManager;
    use skirmish_test_utils::{projectiles, SAMPLE_ABILITIES};

    fn world() -> UnitManager {
        let mut units = UnitManager::new(8);
        units
            .add(
                UnitRecord::new("mage", Team::Friendly, Vec2::new(2.0, 2.0))
                    .with_ability("firebolt")
                    .with_ability("mend"),
            )
            .unwrap();
        units
            .add(UnitRecord::new("orc", Team::Hostile, Vec2::new(6.0, 2.0)))
            .unwrap();
        units
    }

    fn rule() -> AbilityRule {
        AbilityRule::new(AbilityBook::from_json(SAMPLE_ABILITIES).unwrap())
    }

    #[test]
    fn first_ready_ability_fires() {
        let units = world();
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 0);
        let cmds = rule().execute(&mut c).unwrap();
        let kinds: Vec<_> = cmds.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["mark_ability", "effect", "effect"]);
        assert_eq!(cmds[0].str_param("ability"), Some("firebolt"));
        assert_eq!(cmds[1].unit_param("target"), Some(UnitId::from("orc")));
        assert_eq!(cmds[1].params["effect"]["type"], "damage");
    }

    #[test]
    fn cooldown_falls_through_to_next_ability() {
        let mut units = world();
        units
            .cold_mut(&"mage".into())
            .unwrap()
            .last_ability_tick
            .insert("firebolt".into(), 2);
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 4);
        let cmds = rule().execute(&mut c).unwrap();
        assert_eq!(cmds[0].str_param("ability"), Some("mend"));
        assert_eq!(cmds[1].unit_param("target"), Some(UnitId::from("mage")));
    }

    #[test]
    fn out_of_range_and_false_trigger_skip() {
        let mut units = world();
        units.set_position(&"orc".into(), Vec2::new(15.0, 2.0));
        let shots = projectiles(1);
        let mut r = rule();
        r.book_mut().set_trigger(
            "mend",
            Box::new(|caster: &UnitProxy<'_>, _: &UnitProxy<'_>, _: &TickContext<'_>| {
                caster.hp() < caster.max_hp()
            }),
        );
        let mut c = ctx(&units, &shots, 0);
        assert!(r.execute(&mut c).unwrap().is_empty());
    }

    #[test]
    fn stunned_units_do_not_cast() {
        let mut units = world();
        units
            .cold_mut(&"mage".into())
            .unwrap()
            .meta
            .insert(keys::STUNNED.into(), true.into());
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 0);
        assert!(rule().execute(&mut c).unwrap().is_empty());
    }
}
