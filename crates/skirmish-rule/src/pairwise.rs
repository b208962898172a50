//! Pairwise interactions resolved in a single spatial pass.
//!
//! Several combat mechanics look at pairs of nearby units. Instead of each
//! one scanning the grid, [`PairwiseBatch`] walks every close pair once
//! and hands it to each [`PairwiseHandler`] whose range covers it.

use skirmish_core::{QueuedCommand, RuleError};
use skirmish_store::UnitProxy;

use crate::context::TickContext;
use crate::rule::{Rule, RulePhase};

/// Two living units within some handler's reach.
///
/// `a` always occupies the lower slot.
#[derive(Clone, Copy, Debug)]
pub struct UnitPair<'a> {
    /// Unit in the lower slot.
    pub a: UnitProxy<'a>,
    /// Unit in the higher slot.
    pub b: UnitProxy<'a>,
    /// Ground distance between them.
    pub distance: f32,
}

/// One pairwise mechanic.
pub trait PairwiseHandler: 'static {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Largest distance at which this handler cares about a pair.
    fn max_distance(&self) -> f32;

    /// Called once per tick before any pair.
    fn begin_tick(&mut self, _ctx: &TickContext<'_>) {}

    /// Handle one pair.
    fn interact(&mut self, pair: &UnitPair<'_>, ctx: &mut TickContext<'_>)
        -> Result<(), RuleError>;

    /// Called once per tick after every pair was handled without error.
    /// Skipped when any handler in the batch fails, so state committed
    /// here is dropped along with the batch's output.
    fn end_tick(&mut self, _ctx: &TickContext<'_>) {}
}

/// A combat-phase rule fanning close unit pairs out to handlers.
///
/// Each unordered pair of living units within the largest registered
/// distance is visited exactly once per tick, ordered by
/// `(lower slot, higher slot)`. Handlers are called in registration order.
pub struct PairwiseBatch {
    name: String,
    handlers: Vec<Box<dyn PairwiseHandler>>,
}

impl PairwiseBatch {
    /// An empty batch.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
        }
    }

    /// Register a handler.
    pub fn with_handler(mut self, handler: impl PairwiseHandler) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Register a boxed handler.
    pub fn register(&mut self, handler: Box<dyn PairwiseHandler>) {
        self.handlers.push(handler);
    }

    /// Number of handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn reach(&self) -> Option<f32> {
        self.handlers
            .iter()
            .map(|h| h.max_distance())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .reduce(f32::max)
    }
}

impl Rule for PairwiseBatch {
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Combat
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        let Some(reach) = self.reach() else {
            return Ok(Vec::new());
        };
        for handler in &mut self.handlers {
            handler.begin_tick(ctx);
        }

        let block = ctx.units_block();
        let query = ctx.query();
        let pairs = ctx.grid().pairs_within(block, reach);

        for (i, j) in pairs {
            let (Some(id_a), Some(id_b)) = (query.id_at(i), query.id_at(j)) else {
                continue;
            };
            let pair = UnitPair {
                a: UnitProxy::new(id_a, query),
                b: UnitProxy::new(id_b, query),
                distance: block.position(i).distance(block.position(j)),
            };
            for handler in &mut self.handlers {
                if pair.distance <= handler.max_distance() {
                    handler.interact(&pair, ctx)?;
                }
            }
        }
        for handler in &mut self.handlers {
            handler.end_tick(ctx);
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Battlefield, WeatherSnapshot};
    use skirmish_core::{Team, TickId, UnitId, UnitRecord, Vec2};
    use skirmish_store::{ProjectileStore, UnitManager};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        reach: f32,
        seen: Rc<RefCell<Vec<(UnitId, UnitId)>>>,
    }

    impl PairwiseHandler for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn max_distance(&self) -> f32 {
            self.reach
        }
        fn interact(
            &mut self,
            pair: &UnitPair<'_>,
            _ctx: &mut TickContext<'_>,
        ) -> Result<(), RuleError> {
            self.seen
                .borrow_mut()
                .push((pair.a.id().clone(), pair.b.id().clone()));
            Ok(())
        }
    }

    fn line(n: usize, spacing: f32) -> UnitManager {
        let mut m = UnitManager::new(n);
        for i in 0..n {
            m.add(UnitRecord::new(
                format!("u{i}"),
                Team::Friendly,
                Vec2::new(i as f32 * spacing, 0.0),
            ))
            .unwrap();
        }
        m
    }

    #[test]
    fn each_pair_visited_once_per_handler_in_range() {
        let units = line(4, 1.0);
        let projectiles = ProjectileStore::new(1);
        let short = Rc::new(RefCell::new(Vec::new()));
        let long = Rc::new(RefCell::new(Vec::new()));
        let mut batch = PairwiseBatch::new("pairs")
            .with_handler(Recorder {
                reach: 1.0,
                seen: short.clone(),
            })
            .with_handler(Recorder {
                reach: 2.0,
                seen: long.clone(),
            });

        let mut ctx = TickContext::new(
            &units,
            &projectiles,
            Battlefield::default(),
            WeatherSnapshot::default(),
            TickId(0),
        );
        batch.execute(&mut ctx).unwrap();

        let ids = |v: &[(UnitId, UnitId)]| {
            v.iter()
                .map(|(a, b)| format!("{a}-{b}"))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&short.borrow()), vec!["u0-u1", "u1-u2", "u2-u3"]);
        assert_eq!(
            ids(&long.borrow()),
            vec!["u0-u1", "u0-u2", "u1-u2", "u1-u3", "u2-u3"]
        );
    }

    #[test]
    fn empty_batch_does_nothing() {
        let units = line(2, 0.5);
        let projectiles = ProjectileStore::new(1);
        let mut ctx = TickContext::new(
            &units,
            &projectiles,
            Battlefield::default(),
            WeatherSnapshot::default(),
            TickId(0),
        );
        let mut batch = PairwiseBatch::new("pairs");
        assert!(batch.is_empty());
        assert!(batch.execute(&mut ctx).unwrap().is_empty());
        assert!(ctx.queued_commands().is_empty());
    }
}
