//! Approach-the-nearest-enemy AI.

use serde_json::json;
use skirmish_core::{keys, QueuedCommand, RuleError, Vec2};
use skirmish_rule::{Rule, RulePhase, TickContext};
use skirmish_store::batch;

/// Sets every living unit's intended move one step toward its nearest
/// enemy, stopping at `engage_range`.
///
/// Units holding position (posture `"hold"`), stunned units and units in
/// the air get a zero intended move. A command is emitted only when the
/// intended move changes.
#[derive(Debug)]
pub struct AiRule {
    engage_range: f32,
    speed: f32,
}

impl AiRule {
    /// Default engage range and step length.
    pub fn new() -> Self {
        Self {
            engage_range: 1.0,
            speed: 1.0,
        }
    }

    /// Distance at which a unit stops approaching.
    pub fn with_engage_range(mut self, range: f32) -> Self {
        self.engage_range = range;
        self
    }

    /// Longest step per tick.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }
}

impl Default for AiRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for AiRule {
    fn name(&self) -> &str {
        "ai"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Ai
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        let block = ctx.units_block();
        let query = ctx.query();
        let mut out = Vec::new();
        for (index, step) in batch::ai_steps(block, self.engage_range, self.speed) {
            let Some(id) = query.id_at(index) else {
                continue;
            };
            let grounded = ctx.cold(index).is_some_and(|c| {
                c.posture.as_deref() == Some("hold")
                    || c.flag(keys::STUNNED)
                    || c.flag(keys::JUMPING)
            });
            let step = if grounded { Vec2::ZERO } else { step };
            if block.intended_move(index) == step {
                continue;
            }
            out.push(
                QueuedCommand::new("intend_move")
                    .unit(id.clone())
                    .param("dx", json!(step.x))
                    .param("dy", json!(step.y)),
            );
        }
        Ok(out)
    }
}
