//! Reusable rule fixtures.
//!
//! - [`ScriptedRule`]: queues and returns a fixed set of commands.
//! - [`FailingRule`]: queues a command, then fails after N good calls.
//! - [`ProbeRule`]: records what it observed each tick.

use std::cell::RefCell;
use std::rc::Rc;

use skirmish_core::{GameEvent, QueuedCommand, RuleError, UnitId};
use skirmish_rule::{Rule, RulePhase, TickContext};

/// Emits the same commands every tick.
///
/// `queued` go through [`TickContext::queue_command`]; `returned` are
/// the rule's return value. Useful for checking emission order.
pub struct ScriptedRule {
    pub name: String,
    pub phase: RulePhase,
    pub queued: Vec<QueuedCommand>,
    pub returned: Vec<QueuedCommand>,
    pub events: Vec<GameEvent>,
}

impl ScriptedRule {
    pub fn new(name: impl Into<String>, phase: RulePhase) -> Self {
        Self {
            name: name.into(),
            phase,
            queued: Vec::new(),
            returned: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn queue(mut self, cmd: QueuedCommand) -> Self {
        self.queued.push(cmd);
        self
    }

    pub fn returning(mut self, cmd: QueuedCommand) -> Self {
        self.returned.push(cmd);
        self
    }

    pub fn raising(mut self, event: GameEvent) -> Self {
        self.events.push(event);
        self
    }
}

impl Rule for ScriptedRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> RulePhase {
        self.phase
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        for cmd in &self.queued {
            ctx.queue_command(cmd.clone());
        }
        for ev in &self.events {
            ctx.queue_event(ev.clone());
        }
        Ok(self.returned.clone())
    }
}

/// Queues `poison` through the context on every call, then fails once
/// `succeed_count` calls have passed.
///
/// When the pipeline rolls the rule back, `poison` must not reach the
/// command queue.
pub struct FailingRule {
    pub name: String,
    pub poison: QueuedCommand,
    pub succeed_count: usize,
    calls: usize,
}

impl FailingRule {
    pub fn new(name: impl Into<String>, poison: QueuedCommand, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            poison,
            succeed_count,
            calls: 0,
        }
    }
}

impl Rule for FailingRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Combat
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        ctx.queue_command(self.poison.clone());
        self.calls += 1;
        if self.calls > self.succeed_count {
            Err(RuleError::ExecutionFailed {
                reason: format!("failed on call {}", self.calls),
            })
        } else {
            Ok(Vec::new())
        }
    }
}

/// One tick as seen by a [`ProbeRule`].
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub tick: u64,
    pub hp: Option<f32>,
    pub queued_before: usize,
}

/// Records the tick, one unit's hit points, and how many commands were
/// already queued when it ran.
pub struct ProbeRule {
    pub name: String,
    pub phase: RulePhase,
    pub watch: UnitId,
    pub log: Rc<RefCell<Vec<Observation>>>,
}

impl ProbeRule {
    pub fn new(name: impl Into<String>, phase: RulePhase, watch: impl Into<UnitId>) -> Self {
        Self {
            name: name.into(),
            phase,
            watch: watch.into(),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Shared handle to the observations.
    pub fn log(&self) -> Rc<RefCell<Vec<Observation>>> {
        Rc::clone(&self.log)
    }
}

impl Rule for ProbeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> RulePhase {
        self.phase
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        self.log.borrow_mut().push(Observation {
            tick: ctx.tick().0,
            hp: ctx.unit(&self.watch).map(|u| u.hp()),
            queued_before: ctx.queued_commands().len(),
        });
        Ok(Vec::new())
    }
}
