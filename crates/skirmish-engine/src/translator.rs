//! Event → command translation.
//!
//! Events live for one command-processing call. At the end of every pass
//! the queue hands each pending event to an [`EventTranslator`], appends
//! the commands it returns, and discards the event.

use serde_json::json;
use skirmish_core::{GameEvent, QueuedCommand};
use tracing::warn;

/// Turns events into commands.
pub trait EventTranslator {
    /// Commands caused by `event`. Informational events yield none.
    fn translate(&mut self, event: &GameEvent) -> Vec<QueuedCommand>;
}

/// The built-in translation table.
///
/// | event | needs | command |
/// |-------|-------|---------|
/// | `damage` | unit target, `amount` | `damage` |
/// | `heal` | unit target, `amount` | `heal` |
/// | `aoe` | point target, `radius`, `amount`, `team?` | `aoe` |
/// | `knockback` | unit target, `fx`, `fy` | `force` |
/// | `spawn` | point target, `unit_type`, `team?` | `spawn` |
/// | `status` | unit target, `status`, `duration`, `amount?` | `status` |
///
/// Any other kind (`damaged`, `unit_died`, `unit_spawned`, ...) is
/// informational and translates to nothing. Events missing what their
/// kind needs are logged and dropped.
#[derive(Debug, Default)]
pub struct StandardTranslator;

impl StandardTranslator {
    /// The built-in table.
    pub fn new() -> Self {
        Self
    }
}

impl EventTranslator for StandardTranslator {
    fn translate(&mut self, event: &GameEvent) -> Vec<QueuedCommand> {
        let translated = match event.kind.as_str() {
            "damage" | "heal" => unit_command(event, &event.kind, &["amount"]),
            "knockback" => unit_command(event, "force", &["fx", "fy"]),
            "status" => unit_command(event, "status", &["status", "duration"]).map(|mut c| {
                if let Some(a) = event.meta.get("amount") {
                    c.params.insert("amount".to_string(), a.clone());
                }
                c
            }),
            "aoe" => point_command(event, "aoe", &["radius", "amount"]).map(|mut c| {
                if let Some(t) = event.meta.get("team") {
                    c.params.insert("team".to_string(), t.clone());
                }
                c
            }),
            "spawn" => point_command(event, "spawn", &["unit_type"]).map(|mut c| {
                if let Some(t) = event.meta.get("team") {
                    c.params.insert("team".to_string(), t.clone());
                }
                c
            }),
            _ => return Vec::new(),
        };
        match translated {
            Some(c) => vec![c],
            None => {
                warn!(kind = %event.kind, "event is missing its target or payload; dropped");
                Vec::new()
            }
        }
    }
}

/// A command on the event's unit target, copying `keys` from the payload.
fn unit_command(event: &GameEvent, kind: &str, keys: &[&str]) -> Option<QueuedCommand> {
    let target = event.target_unit()?;
    let mut cmd = QueuedCommand::new(kind).unit(target.clone());
    for key in keys {
        cmd = cmd.param(*key, event.meta.get(*key)?.clone());
    }
    if let Some(source) = &event.source {
        cmd = cmd.param("source", source.as_str());
    }
    Some(cmd)
}

/// A command at the event's point target, copying `keys` from the payload.
fn point_command(event: &GameEvent, kind: &str, keys: &[&str]) -> Option<QueuedCommand> {
    let p = event.target_point()?;
    let mut cmd = QueuedCommand::new(kind)
        .param("x", json!(p.x))
        .param("y", json!(p.y));
    for key in keys {
        cmd = cmd.param(*key, event.meta.get(*key)?.clone());
    }
    if let Some(source) = &event.source {
        cmd = match kind {
            "spawn" => cmd.unit(source.clone()),
            _ => cmd.param("source", source.as_str()),
        };
    }
    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{UnitId, Vec2};

    #[test]
    fn damage_event_becomes_damage_command() {
        let ev = GameEvent::new("damage")
            .source("a")
            .on_unit("b")
            .meta("amount", 4.0);
        let cmds = StandardTranslator::new().translate(&ev);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].kind, "damage");
        assert_eq!(cmds[0].unit_id, Some(UnitId::from("b")));
        assert_eq!(cmds[0].f32_param("amount"), Some(4.0));
        assert_eq!(cmds[0].str_param("source"), Some("a"));
    }

    #[test]
    fn aoe_event_uses_point_target() {
        let ev = GameEvent::new("aoe")
            .at_point(Vec2::new(3.0, 4.0))
            .meta("radius", 1.5)
            .meta("amount", 6.0)
            .meta("team", "hostile");
        let cmds = StandardTranslator::new().translate(&ev);
        assert_eq!(cmds[0].kind, "aoe");
        assert_eq!(cmds[0].f32_param("x"), Some(3.0));
        assert_eq!(cmds[0].str_param("team"), Some("hostile"));
    }

    #[test]
    fn knockback_becomes_force() {
        let ev = GameEvent::new("knockback")
            .source("a")
            .on_unit("b")
            .meta("fx", 2.0)
            .meta("fy", 0.0);
        let cmds = StandardTranslator::new().translate(&ev);
        assert_eq!(cmds[0].kind, "force");
        assert_eq!(cmds[0].f32_param("fx"), Some(2.0));
    }

    #[test]
    fn informational_events_translate_to_nothing() {
        let mut t = StandardTranslator::new();
        assert!(t.translate(&GameEvent::new("damaged").on_unit("b")).is_empty());
        assert!(t.translate(&GameEvent::new("unit_died").on_unit("b")).is_empty());
    }

    #[test]
    fn incomplete_events_are_dropped() {
        let mut t = StandardTranslator::new();
        assert!(t.translate(&GameEvent::new("damage").on_unit("b")).is_empty());
        assert!(t
            .translate(&GameEvent::new("aoe").on_unit("b").meta("radius", 1.0))
            .is_empty());
    }
}
