//! Melee combat as a pairwise handler.

use indexmap::{IndexMap, IndexSet};
use skirmish_core::{keys, QueuedCommand, RuleError, UnitId};
use skirmish_rule::{PairwiseHandler, TickContext, UnitPair};
use skirmish_store::UnitProxy;

/// Opposing units within `range` strike each other.
///
/// Each unit strikes at most once every `cooldown` ticks, tracked in a
/// map private to the handler. Strikes are only recorded there once the
/// whole batch finished cleanly. A unit next to several enemies strikes the
/// first one in pair order. Stunned and airborne units do not strike but
/// can still be struck.
#[derive(Debug)]
pub struct MeleeHandler {
    range: f32,
    cooldown: u64,
    last_strike: IndexMap<UnitId, u64>,
    struck: IndexSet<UnitId>,
    tick: u64,
}

impl MeleeHandler {
    /// Reach 1.5 tiles, one strike every 3 ticks.
    pub fn new() -> Self {
        Self {
            range: 1.5,
            cooldown: 3,
            last_strike: IndexMap::new(),
            struck: IndexSet::new(),
            tick: 0,
        }
    }

    /// Melee reach.
    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    /// Ticks between strikes by the same unit.
    pub fn with_cooldown(mut self, cooldown: u64) -> Self {
        self.cooldown = cooldown;
        self
    }

    fn ready(&self, id: &UnitId) -> bool {
        !self.struck.contains(id)
            && self
                .last_strike
                .get(id)
                .is_none_or(|&t| self.tick >= t.saturating_add(self.cooldown.max(1)))
    }

    fn try_strike(
        &mut self,
        attacker: &UnitProxy<'_>,
        target: &UnitProxy<'_>,
        ctx: &mut TickContext<'_>,
    ) {
        if attacker.flag(keys::STUNNED)
            || attacker.flag(keys::JUMPING)
            || !self.ready(attacker.id())
        {
            return;
        }
        self.struck.insert(attacker.id().clone());
        ctx.queue_command(
            QueuedCommand::new("strike")
                .unit(attacker.id().clone())
                .param("target", target.id().as_str()),
        );
    }
}

impl Default for MeleeHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl PairwiseHandler for MeleeHandler {
    fn name(&self) -> &str {
        "melee"
    }

    fn max_distance(&self) -> f32 {
        self.range
    }

    fn begin_tick(&mut self, ctx: &TickContext<'_>) {
        self.tick = ctx.tick().0;
        self.struck.clear();
        let q = ctx.query();
        self.last_strike.retain(|id, _| q.contains(id));
    }

    fn end_tick(&mut self, _ctx: &TickContext<'_>) {
        for id in self.struck.drain(..) {
            self.last_strike.insert(id, self.tick);
        }
    }

    fn interact(
        &mut self,
        pair: &UnitPair<'_>,
        ctx: &mut TickContext<'_>,
    ) -> Result<(), RuleError> {
        if !pair.a.is_enemy_of(&pair.b) {
            return Ok(());
        }
        self.try_strike(&pair.a, &pair.b, ctx);
        self.try_strike(&pair.b, &pair.a, ctx);
        Ok(())
    }
}
