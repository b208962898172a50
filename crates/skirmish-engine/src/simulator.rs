//! The simulator: owns the world and runs one tick per `step()`.
//!
//! A tick has two phases that never overlap:
//!
//! 1. **Rules.** Every rule runs in pipeline order against a read-only
//!    [`TickContext`] and queues commands and events.
//! 2. **Commands.** The [`CommandQueue`] resolves everything queued so far
//!    through the registered executors, which alone hold write access.
//!
//! A rule that returns an error is rolled back: whatever it queued during
//! that call is discarded and the pipeline moves on.

use std::time::Instant;

use skirmish_core::{
    GameEvent, QueuedCommand, StoreError, TickId, UnitId, UnitQuery, UnitRecord, UnitWriter,
};
use skirmish_rule::{Battlefield, Rule, TickContext};
use skirmish_store::{ProjectileStore, UnitManager, UnitProxy};
use tracing::{debug, warn};

use crate::config::{CombatTuning, ConfigError, SimConfig};
use crate::factory::UnitFactory;
use crate::metrics::StepMetrics;
use crate::queue::{CommandQueue, QueueReport};
use crate::registry::{CommandExecutor, CommandRegistry};
use crate::transform::{ExecContext, Transform};
use crate::translator::{EventTranslator, StandardTranslator};
use crate::weather::Weather;

/// Tick-driven battle simulation.
///
/// # Examples
///
/// ```
/// use skirmish_core::{QueuedCommand, Team, UnitRecord, Vec2};
/// use skirmish_engine::{SimConfig, Simulator};
///
/// let mut sim = Simulator::new(SimConfig::default()).unwrap();
/// sim.add_unit(UnitRecord::new("scout", Team::Friendly, Vec2::new(3.0, 3.0)))
///     .unwrap();
/// let step_east = QueuedCommand::new("move").param("dx", 1.0).param("dy", 0.0);
/// sim.queue_command(step_east.unit("scout"));
/// sim.step();
///
/// assert_eq!(sim.unit(&"scout".into()).unwrap().position(), Vec2::new(4.0, 3.0));
/// assert_eq!(sim.current_tick().0, 1);
/// ```
pub struct Simulator {
    units: UnitManager,
    projectiles: ProjectileStore,
    rules: Vec<Box<dyn Rule>>,
    registry: CommandRegistry,
    translator: Box<dyn EventTranslator>,
    factory: Box<dyn UnitFactory>,
    queue: CommandQueue,
    weather: Weather,
    field: Battlefield,
    tuning: CombatTuning,
    tick: TickId,
    last_metrics: StepMetrics,
    last_report: QueueReport,
    pass_cap_hits: u64,
    rule_failures: u64,
}

impl Simulator {
    /// Validate `config` and build an empty world at tick 0 with the
    /// standard executors and event translation.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let SimConfig {
            field,
            unit_capacity,
            projectile_capacity,
            rules,
            factory,
            seed,
            queue,
            weather,
            combat,
        } = config;
        Ok(Self {
            units: UnitManager::new(unit_capacity),
            projectiles: ProjectileStore::new(projectile_capacity),
            rules,
            registry: CommandRegistry::standard(),
            translator: Box::new(StandardTranslator::new()),
            factory,
            queue: CommandQueue::new(queue.max_passes),
            weather: Weather::new(weather, seed),
            field,
            tuning: combat,
            tick: TickId(0),
            last_metrics: StepMetrics::default(),
            last_report: QueueReport::default(),
            pass_cap_hits: 0,
            rule_failures: 0,
        })
    }

    // ── Extension ──────────────────────────────────────────────

    /// Register (or replace) the executor for `kind`.
    pub fn register_executor(
        &mut self,
        kind: impl Into<String>,
        executor: impl CommandExecutor + 'static,
    ) {
        self.registry.register(kind, executor);
    }

    /// The executor table.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Replace the event translator.
    pub fn set_translator(&mut self, translator: impl EventTranslator + 'static) {
        self.translator = Box::new(translator);
    }

    // ── Tick ───────────────────────────────────────────────────

    /// Run every rule, resolve all queued commands, then advance the tick.
    pub fn step(&mut self) -> &StepMetrics {
        let tick_start = Instant::now();
        let tick = self.tick;
        let snapshot = self.weather.sample(tick);

        let mut rule_us = Vec::with_capacity(self.rules.len());
        let mut rolled_back = 0u32;
        let (commands, events) = {
            let mut ctx = TickContext::new(
                &self.units,
                &self.projectiles,
                self.field,
                snapshot,
                tick,
            );
            for rule in self.rules.iter_mut() {
                let checkpoint = ctx.checkpoint();
                let start = Instant::now();
                match rule.execute(&mut ctx) {
                    Ok(returned) => {
                        for cmd in returned {
                            ctx.queue_command(cmd);
                        }
                    }
                    Err(e) => {
                        warn!(
                            rule = rule.name(),
                            tick = tick.0,
                            error = %e,
                            "rule failed; rolled back"
                        );
                        ctx.rollback(checkpoint);
                        rolled_back += 1;
                    }
                }
                rule_us.push((rule.name().to_string(), start.elapsed().as_micros() as u64));
            }
            ctx.into_outbox()
        };
        self.rule_failures += u64::from(rolled_back);
        self.queue.extend(commands);
        self.queue.extend_events(events);

        let cmd_start = Instant::now();
        let report = self.process_commands();
        let command_processing_us = cmd_start.elapsed().as_micros() as u64;

        self.last_metrics = StepMetrics {
            tick: tick.0,
            total_us: tick_start.elapsed().as_micros() as u64,
            rule_us,
            command_processing_us,
            passes: report.passes,
            commands_dispatched: report.dispatched,
            commands_deduplicated: report.deduplicated,
            commands_coalesced: report.coalesced,
            commands_deferred: report.deferred,
            commands_rejected: report.rejected,
            command_errors: report.errors,
            events_translated: report.events_translated,
            rules_rolled_back: rolled_back,
            pass_cap_hits: self.pass_cap_hits,
            rule_failures: self.rule_failures,
        };
        debug!(
            tick = tick.0,
            units = self.units.len(),
            projectiles = self.projectiles.len(),
            passes = report.passes,
            dispatched = report.dispatched,
            errors = report.errors,
            rolled_back,
            total_us = self.last_metrics.total_us,
            "tick complete"
        );
        self.tick = TickId(tick.0 + 1);
        &self.last_metrics
    }

    /// Resolve everything queued at the current tick without running
    /// rules or advancing the tick.
    pub fn process_commands(&mut self) -> QueueReport {
        let transform = Transform::new(&mut self.units, &mut self.projectiles, self.field);
        let mut ctx = ExecContext::new(transform, self.tick, &self.tuning, &*self.factory);
        let report = self.queue.process(
            self.tick,
            &mut self.registry,
            &mut *self.translator,
            &mut ctx,
        );
        if report.hit_pass_cap() {
            self.pass_cap_hits += 1;
        }
        self.last_report = report.clone();
        report
    }

    // ── Requests ───────────────────────────────────────────────

    /// Queue a command for the next command-processing call.
    pub fn queue_command(&mut self, command: QueuedCommand) {
        self.queue.push(command);
    }

    /// Queue an event, stamping the current tick if it has none.
    pub fn queue_event(&mut self, mut event: GameEvent) {
        event.stamp(self.tick);
        self.queue.push_event(event);
    }

    // ── Direct store access ────────────────────────────────────

    /// Add a unit outside the command pipeline.
    pub fn add_unit(&mut self, record: UnitRecord) -> Result<usize, StoreError> {
        self.units.add_unit(record)
    }

    /// Remove a unit outside the command pipeline.
    pub fn remove_unit(&mut self, id: &UnitId) -> Option<UnitRecord> {
        self.units.remove_unit(id)
    }

    /// A live view of a stored unit.
    pub fn unit(&self, id: &UnitId) -> Option<UnitProxy<'_>> {
        let stored = self.units.id_at(self.units.index_of(id)?)?;
        Some(UnitProxy::new(stored, &self.units))
    }

    /// The unit store.
    pub fn units(&self) -> &UnitManager {
        &self.units
    }

    /// The projectile store.
    pub fn projectiles(&self) -> &ProjectileStore {
        &self.projectiles
    }

    // ── Introspection ──────────────────────────────────────────

    /// The tick the next `step()` runs.
    pub fn current_tick(&self) -> TickId {
        self.tick
    }

    /// Battlefield bounds.
    pub fn field(&self) -> Battlefield {
        self.field
    }

    /// Rule names in pipeline order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Commands still waiting: deferred or rolled over by the pass cap.
    pub fn pending_commands(&self) -> &[QueuedCommand] {
        self.queue.pending()
    }

    /// Events translated by the last command-processing call.
    pub fn processed_events(&self) -> &[GameEvent] {
        self.queue.processed_events()
    }

    /// Metrics from the last `step()`.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Report from the last command-processing call.
    pub fn last_report(&self) -> &QueueReport {
        &self.last_report
    }
}
