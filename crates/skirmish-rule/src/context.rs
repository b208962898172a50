//! Execution context handed to rules for one tick.
//!
//! [`TickContext`] is the only thing a rule sees. It offers read access to
//! units, projectiles and the environment, and two append-only outboxes for
//! commands and events. Nothing on it mutates the store.

use skirmish_core::{
    ColdData, GameEvent, QueuedCommand, Team, TickId, UnitId, UnitQuery, Vec2,
};
use skirmish_store::{ProjectileStore, SpatialGrid, UnitBlock, UnitManager, UnitProxy};

// ── Environment ────────────────────────────────────────────────────

/// Size and indexing resolution of the playing field.
///
/// The field spans `[0, width] × [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Battlefield {
    /// Extent along x, in tiles.
    pub width: f32,
    /// Extent along y, in tiles.
    pub height: f32,
    /// Spatial grid cell edge, in tiles.
    pub cell_size: f32,
}

impl Battlefield {
    /// A field of the given size with 2-tile grid cells.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cell_size: 2.0,
        }
    }

    /// Whether `p` lies on the field.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }

    /// Nearest point on the field.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new(64.0, 64.0)
    }
}

/// Weather as seen by rules for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature at the field origin, °C.
    pub temperature: f32,
    /// Temperature change per tile along x and y.
    pub gradient: Vec2,
    /// Wind vector, tiles per tick.
    pub wind: Vec2,
    /// Precipitation intensity, `0..=1`.
    pub precipitation: f32,
}

impl WeatherSnapshot {
    /// Temperature sampled at `p`.
    pub fn temperature_at(&self, p: Vec2) -> f32 {
        self.temperature + self.gradient.x * p.x + self.gradient.y * p.y
    }
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            temperature: 20.0,
            gradient: Vec2::ZERO,
            wind: Vec2::ZERO,
            precipitation: 0.0,
        }
    }
}

// ── Context ────────────────────────────────────────────────────────

/// Lengths of the outboxes at some point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    commands: usize,
    events: usize,
}

/// Per-tick view handed to every rule.
///
/// Proxies returned by the query methods borrow the store, not the
/// context, so they can be held while queueing commands.
pub struct TickContext<'a> {
    units: &'a UnitManager,
    projectiles: &'a ProjectileStore,
    grid: SpatialGrid,
    field: Battlefield,
    weather: WeatherSnapshot,
    tick: TickId,
    commands: Vec<QueuedCommand>,
    events: Vec<GameEvent>,
}

impl<'a> TickContext<'a> {
    /// Build a context for `tick`, indexing living units for spatial
    /// queries.
    pub fn new(
        units: &'a UnitManager,
        projectiles: &'a ProjectileStore,
        field: Battlefield,
        weather: WeatherSnapshot,
        tick: TickId,
    ) -> Self {
        Self {
            units,
            projectiles,
            grid: SpatialGrid::from_block(field.cell_size, units.block()),
            field,
            weather,
            tick,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Current tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Field extent.
    pub fn field(&self) -> Battlefield {
        self.field
    }

    /// Weather this tick.
    pub fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }

    /// Temperature at `p`.
    pub fn temperature_at(&self, p: Vec2) -> f32 {
        self.weather.temperature_at(p)
    }

    // ── Queries ────────────────────────────────────────────────

    fn proxy_at(&self, index: usize) -> Option<UnitProxy<'a>> {
        let units: &'a UnitManager = self.units;
        units.id_at(index).map(|id| UnitProxy::new(id, units))
    }

    /// A unit by id, if stored.
    pub fn unit(&self, id: &UnitId) -> Option<UnitProxy<'a>> {
        self.proxy_at(self.units.index_of(id)?)
    }

    /// Every stored unit, dead ones included, in slot order.
    pub fn units(&self) -> Vec<UnitProxy<'a>> {
        self.units
            .active_indices()
            .into_iter()
            .filter_map(|i| self.proxy_at(i))
            .collect()
    }

    /// Living units within `radius` of `center`, in slot order.
    pub fn units_in_radius(&self, center: Vec2, radius: f32) -> Vec<UnitProxy<'a>> {
        self.grid
            .query_radius(self.units.block(), center, radius)
            .into_iter()
            .filter_map(|i| self.proxy_at(i))
            .collect()
    }

    /// Living units inside the rectangle `[min, max]`, in slot order.
    pub fn units_in_rect(&self, min: Vec2, max: Vec2) -> Vec<UnitProxy<'a>> {
        self.grid
            .query_rect(self.units.block(), min, max)
            .into_iter()
            .filter_map(|i| self.proxy_at(i))
            .collect()
    }

    /// Stored units of `team`, in slot order.
    pub fn units_of_team(&self, team: Team) -> Vec<UnitProxy<'a>> {
        let block = self.units.block();
        self.units
            .active_indices()
            .into_iter()
            .filter(|&i| block.team_of(i) == team)
            .filter_map(|i| self.proxy_at(i))
            .collect()
    }

    // ── Escape hatches ─────────────────────────────────────────

    /// Raw hot arrays, for batch code.
    pub fn units_block(&self) -> &'a UnitBlock {
        self.units.block()
    }

    /// Cold data by slot.
    pub fn cold(&self, index: usize) -> Option<&'a ColdData> {
        let units: &'a UnitManager = self.units;
        units.cold_at(index)
    }

    /// Projectile store.
    pub fn projectiles(&self) -> &'a ProjectileStore {
        self.projectiles
    }

    /// The read trait object behind every proxy.
    pub fn query(&self) -> &'a dyn UnitQuery {
        self.units
    }

    /// Spatial index of living units.
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    // ── Outboxes ───────────────────────────────────────────────

    /// Request a mutation.
    pub fn queue_command(&mut self, command: QueuedCommand) {
        self.commands.push(command);
    }

    /// Raise an event, stamping the current tick if it has none.
    pub fn queue_event(&mut self, mut event: GameEvent) {
        event.stamp(self.tick);
        self.events.push(event);
    }

    /// Commands queued so far.
    pub fn queued_commands(&self) -> &[QueuedCommand] {
        &self.commands
    }

    /// Events queued so far.
    pub fn queued_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Remember the current outbox lengths.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            commands: self.commands.len(),
            events: self.events.len(),
        }
    }

    /// Drop everything queued since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.commands.truncate(checkpoint.commands);
        self.events.truncate(checkpoint.events);
    }

    /// Consume the context, yielding the queued commands and events.
    pub fn into_outbox(self) -> (Vec<QueuedCommand>, Vec<GameEvent>) {
        (self.commands, self.events)
    }
}
