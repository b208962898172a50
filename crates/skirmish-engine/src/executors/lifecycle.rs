//! Executors that create, remove or annotate units.

use skirmish_core::{CommandError, GameEvent, QueuedCommand, Team, UnitId, UnitQuery, Vec2};

use super::subject;
use crate::registry::CommandExecutor;
use crate::transform::{ExecContext, UnitChanges};

/// `meta {meta: {...}}`: merge a metadata patch. `null` values delete.
pub struct MetaExecutor;

impl CommandExecutor for MetaExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let patch = match cmd.params.get("meta") {
            None | Some(serde_json::Value::Null) => {
                return Err(CommandError::MissingParam {
                    kind: cmd.kind.clone(),
                    param: "meta".to_string(),
                })
            }
            Some(serde_json::Value::Object(patch)) => patch.clone(),
            Some(_) => {
                return Err(CommandError::InvalidParam {
                    kind: cmd.kind.clone(),
                    param: "meta".to_string(),
                    reason: "expected an object".to_string(),
                })
            }
        };
        ctx.transform()
            .update_unit(id, UnitChanges::new().meta_patch(patch))
    }
}

/// `remove`: drop the unit from the store.
pub struct RemoveExecutor;

impl CommandExecutor for RemoveExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = cmd.require_unit()?;
        ctx.transform()
            .remove_unit(id)
            .map(|_| ())
            .ok_or_else(|| CommandError::UnknownUnit { id: id.clone() })
    }
}

/// `spawn {unit_type, x, y, team?, id?}`.
///
/// The team defaults to the spawning unit's, then the template's, then
/// neutral. Without an `id`, one is generated from the unit type and a
/// counter private to this executor.
#[derive(Debug, Default)]
pub struct SpawnExecutor {
    serial: u64,
}

impl SpawnExecutor {
    fn fresh_id(&mut self, unit_type: &str, q: &dyn UnitQuery) -> UnitId {
        loop {
            self.serial += 1;
            let id = UnitId::from(format!("{unit_type}-{}", self.serial));
            if !q.contains(&id) {
                return id;
            }
        }
    }
}

impl CommandExecutor for SpawnExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let unit_type = cmd.require_str("unit_type")?;
        let position = ctx
            .field()
            .clamp(Vec2::new(cmd.require_f32("x")?, cmd.require_f32("y")?));
        let template =
            ctx.factory()
                .template(unit_type)
                .ok_or_else(|| CommandError::UnknownTemplate {
                    unit_type: unit_type.to_string(),
                })?;

        let team = match cmd.str_param("team") {
            Some(name) => Team::parse(name).ok_or_else(|| CommandError::InvalidParam {
                kind: cmd.kind.clone(),
                param: "team".to_string(),
                reason: format!("unknown team '{name}'"),
            })?,
            None => cmd
                .unit_id
                .as_ref()
                .and_then(|spawner| ctx.query().team(spawner))
                .or(template.team)
                .unwrap_or_default(),
        };
        let id = match cmd.str_param("id") {
            Some(id) => UnitId::from(id),
            None => self.fresh_id(unit_type, ctx.query()),
        };

        let record = template.instantiate(unit_type, id.clone(), team, position);
        ctx.transform().add_unit(record)?;
        let mut spawned = GameEvent::new("unit_spawned")
            .on_unit(id)
            .meta("unit_type", unit_type);
        spawned.source = cmd.unit_id.clone();
        ctx.emit(spawned);
        Ok(())
    }
}

/// `posture {posture?, target?}`: set the cold posture and intended
/// target. At least one must be given.
pub struct PostureExecutor;

impl CommandExecutor for PostureExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let posture = cmd.str_param("posture").map(str::to_string);
        let target = cmd.unit_param("target");
        if posture.is_none() && target.is_none() {
            return Err(CommandError::MissingParam {
                kind: cmd.kind.clone(),
                param: "posture".to_string(),
            });
        }
        let changes = UnitChanges {
            posture,
            intended_target: target,
            ..UnitChanges::new()
        };
        ctx.transform().update_unit(id, changes)
    }
}

/// `mark_ability {ability}`: record that the ability was used this tick.
pub struct MarkAbilityExecutor;

impl CommandExecutor for MarkAbilityExecutor {
    fn execute(
        &mut self,
        cmd: &QueuedCommand,
        ctx: &mut ExecContext<'_>,
    ) -> Result<(), CommandError> {
        let id = subject(cmd, ctx)?;
        let ability = cmd.require_str("ability")?.to_string();
        let changes = UnitChanges {
            ability_used: Some((ability, ctx.tick().0)),
            ..UnitChanges::new()
        };
        ctx.transform().update_unit(id, changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::testing::World;
    use crate::factory::TemplateFactory;
    use serde_json::{json, Value};
    use skirmish_core::StoreError;

    const TEMPLATES: &str = r#"{
        "imp":  {"hp": 10, "damage": 2, "tags": ["ai", "flying"]},
        "wall": {"hp": 500, "mass": 50, "team": "neutral"}
    }"#;

    #[test]
    fn meta_merges_and_deletes() {
        let mut w = World::new();
        let set = QueuedCommand::new("meta")
            .unit("a")
            .param("meta", json!({"x": 1, "y": 2}));
        let del = QueuedCommand::new("meta")
            .unit("a")
            .param("meta", json!({"x": null}));
        w.run(&mut MetaExecutor, set).0.unwrap();
        w.run(&mut MetaExecutor, del).0.unwrap();
        let meta = w.units.cold(&"a".into()).unwrap().meta.clone();
        assert_eq!(Value::Object(meta), json!({"y": 2}));
    }

    #[test]
    fn meta_requires_an_object() {
        let mut w = World::new();
        let (r, ..) = w.run(
            &mut MetaExecutor,
            QueuedCommand::new("meta").unit("a").param("meta", 3),
        );
        assert!(matches!(r, Err(CommandError::InvalidParam { .. })));
    }

    #[test]
    fn remove_frees_the_slot() {
        let mut w = World::new();
        w.run(&mut RemoveExecutor, QueuedCommand::new("remove").unit("b"))
            .0
            .unwrap();
        assert!(!w.units.contains(&"b".into()));
        let (r, ..) = w.run(&mut RemoveExecutor, QueuedCommand::new("remove").unit("b"));
        assert!(matches!(r, Err(CommandError::UnknownUnit { .. })));
    }

    #[test]
    fn spawn_uses_template_and_spawner_team() {
        let mut w = World::new();
        w.factory = TemplateFactory::from_json(TEMPLATES).unwrap();
        let mut exec = SpawnExecutor::default();
        let (r, _, events) = w.run(
            &mut exec,
            QueuedCommand::new("spawn")
                .unit("b")
                .param("unit_type", "imp")
                .param("x", 2.0)
                .param("y", 3.0),
        );
        r.unwrap();
        let id = UnitId::from("imp-1");
        assert_eq!(w.units.team(&id), Some(Team::Hostile));
        assert_eq!(w.units.hp(&id), Some(10.0));
        assert_eq!(events[0].kind, "unit_spawned");

        let (r, ..) = w.run(
            &mut exec,
            QueuedCommand::new("spawn")
                .param("unit_type", "wall")
                .param("x", 0.0)
                .param("y", 0.0)
                .param("id", "w"),
        );
        r.unwrap();
        assert_eq!(w.units.team(&"w".into()), Some(Team::Neutral));
    }

    #[test]
    fn spawn_failures_are_errors() {
        let mut w = World::new();
        w.factory = TemplateFactory::from_json(TEMPLATES).unwrap();
        let mut exec = SpawnExecutor::default();
        let unknown = QueuedCommand::new("spawn")
            .param("unit_type", "dragon")
            .param("x", 0.0)
            .param("y", 0.0);
        let (r, ..) = w.run(&mut exec, unknown);
        assert!(matches!(r, Err(CommandError::UnknownTemplate { .. })));

        let dup = QueuedCommand::new("spawn")
            .param("unit_type", "imp")
            .param("x", 0.0)
            .param("y", 0.0)
            .param("id", "a");
        let (r, ..) = w.run(&mut exec, dup);
        assert!(matches!(
            r,
            Err(CommandError::Store(StoreError::DuplicateId { .. }))
        ));
    }

    #[test]
    fn posture_and_mark_ability() {
        let mut w = World::new();
        w.tick = 12;
        w.run(
            &mut PostureExecutor,
            QueuedCommand::new("posture")
                .unit("a")
                .param("posture", "hold")
                .param("target", "c"),
        )
        .0
        .unwrap();
        w.run(
            &mut MarkAbilityExecutor,
            QueuedCommand::new("mark_ability")
                .unit("a")
                .param("ability", "firebolt"),
        )
        .0
        .unwrap();
        let cold = w.units.cold(&"a".into()).unwrap();
        assert_eq!(cold.posture.as_deref(), Some("hold"));
        assert_eq!(cold.intended_target, Some(UnitId::from("c")));
        assert_eq!(cold.last_ability_tick.get("firebolt"), Some(&12));

        let (r, ..) = w.run(&mut PostureExecutor, QueuedCommand::new("posture").unit("a"));
        assert!(matches!(r, Err(CommandError::MissingParam { .. })));
    }
}
