//! Queued commands and transient events.
//!
//! A [`QueuedCommand`] is a declarative request to mutate simulation state.
//! Rules and executors never touch storage; they enqueue commands which the
//! engine's command queue dispatches to the executor registered for
//! [`QueuedCommand::kind`].
//!
//! A [`GameEvent`] is a tick-scoped notification. Events are translated
//! into commands once per command-processing cycle and then discarded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CommandError;
use crate::id::{TickId, UnitId};
use crate::unit::Vec2;

/// A command waiting in the queue.
///
/// # Examples
///
/// ```
/// use skirmish_core::{QueuedCommand, TickId};
///
/// let cmd = QueuedCommand::new("damage")
///     .unit("orc-1")
///     .param("amount", 12.0)
///     .at_tick(5)
///     .with_id("volley-3");
///
/// assert_eq!(cmd.f32_param("amount"), Some(12.0));
/// assert!(!cmd.is_ready(TickId(4)));
/// assert!(cmd.is_ready(TickId(5)));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueuedCommand {
    /// Executor tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// The unit the command acts on, if any.
    #[serde(default, rename = "unitId", skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<UnitId>,
    /// Earliest tick at which the command may execute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    /// Deduplication key: within one pass, only the first command with a
    /// given id is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl QueuedCommand {
    /// An immediate command of the given kind with no params.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Map::new(),
            unit_id: None,
            tick: None,
            id: None,
        }
    }

    /// Target a unit.
    pub fn unit(mut self, unit: impl Into<UnitId>) -> Self {
        self.unit_id = Some(unit.into());
        self
    }

    /// Set a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Defer execution until `tick`.
    pub fn at_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attach a deduplication id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether the command may run at `current`.
    pub fn is_ready(&self, current: TickId) -> bool {
        self.tick.is_none_or(|t| t <= current.0)
    }

    /// A finite numeric param. Missing, non-numeric, NaN and infinite
    /// values all read as `None`.
    pub fn f32_param(&self, key: &str) -> Option<f32> {
        let v = self.params.get(key)?.as_f64()? as f32;
        v.is_finite().then_some(v)
    }

    /// A string param.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.as_str()
    }

    /// A boolean param.
    pub fn bool_param(&self, key: &str) -> Option<bool> {
        self.params.get(key)?.as_bool()
    }

    /// A param naming a unit.
    pub fn unit_param(&self, key: &str) -> Option<UnitId> {
        self.str_param(key).map(UnitId::from)
    }

    /// An object param.
    pub fn object_param(&self, key: &str) -> Option<&Map<String, Value>> {
        self.params.get(key)?.as_object()
    }

    /// A finite numeric param, or an error naming what is wrong with it.
    pub fn require_f32(&self, key: &str) -> Result<f32, CommandError> {
        match self.params.get(key) {
            None | Some(Value::Null) => Err(CommandError::MissingParam {
                kind: self.kind.clone(),
                param: key.to_string(),
            }),
            Some(_) => self.f32_param(key).ok_or_else(|| CommandError::InvalidParam {
                kind: self.kind.clone(),
                param: key.to_string(),
                reason: "expected a finite number".to_string(),
            }),
        }
    }

    /// A string param, or an error if missing or not a string.
    pub fn require_str(&self, key: &str) -> Result<&str, CommandError> {
        match self.params.get(key) {
            None | Some(Value::Null) => Err(CommandError::MissingParam {
                kind: self.kind.clone(),
                param: key.to_string(),
            }),
            Some(v) => v.as_str().ok_or_else(|| CommandError::InvalidParam {
                kind: self.kind.clone(),
                param: key.to_string(),
                reason: "expected a string".to_string(),
            }),
        }
    }

    /// The target unit, or an error if the command has none.
    pub fn require_unit(&self) -> Result<&UnitId, CommandError> {
        self.unit_id.as_ref().ok_or_else(|| CommandError::MissingParam {
            kind: self.kind.clone(),
            param: "unitId".to_string(),
        })
    }
}

/// What an event is about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTarget {
    /// A unit.
    Unit(UnitId),
    /// A point on the field.
    Point(Vec2),
}

/// A transient notification, translated into commands within the tick it
/// was raised in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Event kind (`"damage"`, `"aoe"`, `"unit_died"`, ...).
    pub kind: String,
    /// Unit that caused the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<UnitId>,
    /// What the event is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EventTarget>,
    /// Kind-specific payload.
    #[serde(default)]
    pub meta: Map<String, Value>,
    /// Tick the event was raised on. Stamped on enqueue when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
}

impl GameEvent {
    /// An event of the given kind with no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            source: None,
            target: None,
            meta: Map::new(),
            tick: None,
        }
    }

    /// Set the source unit.
    pub fn source(mut self, source: impl Into<UnitId>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Target a unit.
    pub fn on_unit(mut self, unit: impl Into<UnitId>) -> Self {
        self.target = Some(EventTarget::Unit(unit.into()));
        self
    }

    /// Target a point.
    pub fn at_point(mut self, point: Vec2) -> Self {
        self.target = Some(EventTarget::Point(point));
        self
    }

    /// Set a payload entry.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Stamp the tick if none is set yet.
    pub fn stamp(&mut self, tick: TickId) {
        if self.tick.is_none() {
            self.tick = Some(tick.0);
        }
    }

    /// A finite numeric payload entry.
    pub fn f32_meta(&self, key: &str) -> Option<f32> {
        let v = self.meta.get(key)?.as_f64()? as f32;
        v.is_finite().then_some(v)
    }

    /// The targeted unit, if the target is a unit.
    pub fn target_unit(&self) -> Option<&UnitId> {
        match &self.target {
            Some(EventTarget::Unit(id)) => Some(id),
            _ => None,
        }
    }

    /// The targeted point, if the target is a point.
    pub fn target_point(&self) -> Option<Vec2> {
        match &self.target {
            Some(EventTarget::Point(p)) => Some(*p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nan_and_missing_params_read_as_none() {
        let cmd = QueuedCommand::new("damage")
            .param("amount", f64::NAN)
            .param("label", "x");
        // serde_json stores NaN as null.
        assert_eq!(cmd.f32_param("amount"), None);
        assert_eq!(cmd.f32_param("label"), None);
        assert_eq!(cmd.f32_param("missing"), None);
    }

    #[test]
    fn require_reports_missing_vs_invalid() {
        let cmd = QueuedCommand::new("jump").param("target_x", "east");
        assert!(matches!(
            cmd.require_f32("target_y"),
            Err(CommandError::MissingParam { .. })
        ));
        assert!(matches!(
            cmd.require_f32("target_x"),
            Err(CommandError::InvalidParam { .. })
        ));
        assert!(matches!(
            cmd.require_unit(),
            Err(CommandError::MissingParam { .. })
        ));
    }

    #[test]
    fn readiness_follows_tick_field() {
        let now = QueuedCommand::new("heal");
        assert!(now.is_ready(TickId(0)));
        let later = QueuedCommand::new("heal").at_tick(3);
        assert!(!later.is_ready(TickId(2)));
        assert!(later.is_ready(TickId(3)));
        assert!(later.is_ready(TickId(9)));
    }

    #[test]
    fn command_uses_wire_field_names() {
        let cmd: QueuedCommand = serde_json::from_value(json!({
            "type": "move",
            "unitId": "a",
            "params": {"dx": 1, "dy": 0},
        }))
        .unwrap();
        assert_eq!(cmd.kind, "move");
        assert_eq!(cmd.unit_id, Some(UnitId::from("a")));
        assert_eq!(cmd.f32_param("dx"), Some(1.0));
        assert_eq!(cmd.tick, None);
    }

    #[test]
    fn event_stamp_keeps_existing_tick() {
        let mut ev = GameEvent::new("aoe");
        ev.stamp(TickId(4));
        assert_eq!(ev.tick, Some(4));
        ev.stamp(TickId(9));
        assert_eq!(ev.tick, Some(4));
    }

    #[test]
    fn event_targets_deserialize_untagged() {
        let ev: GameEvent = serde_json::from_value(json!({
            "kind": "aoe",
            "target": {"x": 2.0, "y": 3.0},
            "meta": {"radius": 1.5}
        }))
        .unwrap();
        assert_eq!(ev.target_point(), Some(Vec2::new(2.0, 3.0)));
        assert_eq!(ev.f32_meta("radius"), Some(1.5));

        let ev: GameEvent =
            serde_json::from_value(json!({"kind": "damage", "target": "orc"})).unwrap();
        assert_eq!(ev.target_unit(), Some(&UnitId::from("orc")));
    }
}
