//! Ground movement, crowd separation and jump arcs.

use serde_json::{json, Value};
use skirmish_core::{keys, QueuedCommand, RuleError, Vec2};
use skirmish_rule::{Rule, RulePhase, TickContext};
use skirmish_store::{batch, UnitProxy};
use tracing::warn;

// ── MovementRule ───────────────────────────────────────────────────

/// Turns intended moves into `move` commands.
///
/// The step is clamped to `max_speed` and halved when the unit is slowed
/// or standing somewhere below freezing. Dead, stunned and airborne units
/// do not move.
#[derive(Debug)]
pub struct MovementRule {
    max_speed: f32,
}

impl MovementRule {
    /// One tile per tick.
    pub fn new() -> Self {
        Self { max_speed: 1.0 }
    }

    /// Longest step per tick.
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }
}

impl Default for MovementRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MovementRule {
    fn name(&self) -> &str {
        "movement"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Movement
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        let mut out = Vec::new();
        for unit in ctx.units() {
            let intended = unit.intended_move();
            if intended == Vec2::ZERO
                || !unit.is_alive()
                || unit.flag(keys::STUNNED)
                || unit.flag(keys::JUMPING)
            {
                continue;
            }
            let mut step = intended.clamp_length(self.max_speed);
            if unit.flag(keys::SLOWED) || ctx.temperature_at(unit.position()) < 0.0 {
                step = step * 0.5;
            }
            out.push(
                QueuedCommand::new("move")
                    .unit(unit.id().clone())
                    .param("dx", json!(step.x))
                    .param("dy", json!(step.y)),
            );
        }
        Ok(out)
    }
}

// ── SeparationRule ─────────────────────────────────────────────────

/// Pushes overlapping living units apart with `force` commands.
///
/// Units in the air are neither pushed nor push others out of the way.
#[derive(Debug)]
pub struct SeparationRule {
    min_distance: f32,
    strength: f32,
}

impl SeparationRule {
    /// Keep units 0.8 tiles apart at full strength.
    pub fn new() -> Self {
        Self {
            min_distance: 0.8,
            strength: 1.0,
        }
    }

    /// Distance below which units push each other.
    pub fn with_min_distance(mut self, min_distance: f32) -> Self {
        self.min_distance = min_distance;
        self
    }

    /// Scale of the push.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }
}

impl Default for SeparationRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for SeparationRule {
    fn name(&self) -> &str {
        "separation"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Movement
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        let block = ctx.units_block();
        let query = ctx.query();
        let grounded = |index: usize| !ctx.cold(index).is_some_and(|c| c.flag(keys::JUMPING));
        let forces = batch::separation_forces_among(
            block,
            ctx.grid(),
            self.min_distance,
            self.strength,
            grounded,
        );
        let mut out = Vec::new();
        for (index, force) in forces {
            let Some(id) = query.id_at(index) else {
                continue;
            };
            out.push(
                QueuedCommand::new("force")
                    .unit(id.clone())
                    .param("fx", json!(force.x))
                    .param("fy", json!(force.y)),
            );
        }
        Ok(out)
    }
}

// ── AirborneRule ───────────────────────────────────────────────────

/// Flies jump arcs recorded by the `jump` executor.
///
/// With `p = (tick - start) / duration`, a unit mid-flight is teleported
/// to `origin + (target - origin) * p` at height `4h * p * (1 - p)`. Once
/// `p >= 1` it lands exactly on the target at `z = 0` and its jump
/// metadata is cleared, leaving `jumping = false`.
#[derive(Debug, Default)]
pub struct AirborneRule;

impl AirborneRule {
    /// The rule.
    pub fn new() -> Self {
        Self
    }
}

struct JumpArc {
    origin: Vec2,
    target: Vec2,
    start: u64,
    duration: u64,
    height: f32,
}

impl JumpArc {
    fn read(unit: &UnitProxy<'_>) -> Option<Self> {
        let f = |key| unit.meta(key).and_then(Value::as_f64).map(|v| v as f32);
        let u = |key| unit.meta(key).and_then(Value::as_u64);
        Some(Self {
            origin: Vec2::new(f(keys::JUMP_ORIGIN_X)?, f(keys::JUMP_ORIGIN_Y)?),
            target: Vec2::new(f(keys::JUMP_TARGET_X)?, f(keys::JUMP_TARGET_Y)?),
            start: u(keys::JUMP_START)?,
            duration: u(keys::JUMP_DURATION)?.max(1),
            height: f(keys::JUMP_HEIGHT).unwrap_or(0.0),
        })
    }
}

fn landing(unit: &UnitProxy<'_>, at: Vec2) -> [QueuedCommand; 2] {
    let mut meta = serde_json::Map::new();
    meta.insert(keys::JUMPING.to_string(), Value::Bool(false));
    for key in [
        keys::JUMP_ORIGIN_X,
        keys::JUMP_ORIGIN_Y,
        keys::JUMP_TARGET_X,
        keys::JUMP_TARGET_Y,
        keys::JUMP_START,
        keys::JUMP_DURATION,
        keys::JUMP_HEIGHT,
    ] {
        meta.insert(key.to_string(), Value::Null);
    }
    [
        QueuedCommand::new("teleport")
            .unit(unit.id().clone())
            .param("x", json!(at.x))
            .param("y", json!(at.y))
            .param("z", 0.0),
        QueuedCommand::new("meta")
            .unit(unit.id().clone())
            .param("meta", Value::Object(meta)),
    ]
}

impl Rule for AirborneRule {
    fn name(&self) -> &str {
        "airborne"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Movement
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        let tick = ctx.tick().0;
        let mut out = Vec::new();
        for unit in ctx.units() {
            if !unit.flag(keys::JUMPING) {
                continue;
            }
            let Some(arc) = JumpArc::read(&unit) else {
                warn!(unit = %unit.id(), "jump metadata incomplete; landing in place");
                out.extend(landing(&unit, unit.position()));
                continue;
            };
            if tick <= arc.start {
                continue;
            }
            let p = (tick - arc.start) as f32 / arc.duration as f32;
            if p >= 1.0 {
                out.extend(landing(&unit, arc.target));
                continue;
            }
            let at = arc.origin + (arc.target - arc.origin) * p;
            let z = 4.0 * arc.height * p * (1.0 - p);
            out.push(
                QueuedCommand::new("teleport")
                    .unit(unit.id().clone())
                    .param("x", json!(at.x))
                    .param("y", json!(at.y))
                    .param("z", json!(z)),
            );
        }
        Ok(out)
    }
}
