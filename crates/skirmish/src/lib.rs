//! Skirmish: a tick-driven tactical battle simulation core.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Skirmish sub-crates. For most users, adding `skirmish` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use skirmish::prelude::*;
//!
//! let config = SimConfig {
//!     rules: default_pipeline(),
//!     ..SimConfig::default()
//! };
//! let mut sim = Simulator::new(config).unwrap();
//! sim.add_unit(UnitRecord::new("knight", Team::Friendly, Vec2::new(5.0, 5.0)))
//!     .unwrap();
//! sim.add_unit(UnitRecord::new("orc", Team::Hostile, Vec2::new(6.0, 5.0)))
//!     .unwrap();
//!
//! sim.step();
//!
//! let knight = sim.unit(&"knight".into()).unwrap();
//! assert!(knight.hp() < knight.max_hp());
//! assert_eq!(sim.current_tick(), TickId(1));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `skirmish-core` | IDs, unit records, commands, events, errors, store traits |
//! | [`store`] | `skirmish-store` | Unit and projectile storage, proxies, spatial grid |
//! | [`rule`] | `skirmish-rule` | Rule trait, tick context, pairwise batching, abilities |
//! | [`rules`] | `skirmish-rules` | The stock rule pipeline |
//! | [`engine`] | `skirmish-engine` | Command queue, executors and the simulator |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`skirmish-core`).
pub use skirmish_core as types;

/// Unit and projectile storage (`skirmish-store`).
///
/// [`store::UnitManager`] keeps the hot unit block and cold data in step;
/// [`store::UnitProxy`] is the read-only view rules work with.
pub use skirmish_store as store;

/// Rule trait and per-tick context (`skirmish-rule`).
///
/// The [`rule::Rule`] trait is the main extension point for game logic.
pub use skirmish_rule as rule;

/// The stock rules (`skirmish-rules`).
pub use skirmish_rules as rules;

/// The simulator (`skirmish-engine`).
///
/// [`engine::Simulator`] runs rules, resolves commands and advances the
/// tick. New command kinds plug in through [`engine::CommandExecutor`].
pub use skirmish_engine as engine;

/// Common imports for typical Skirmish usage.
///
/// ```rust
/// use skirmish::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use skirmish_core::{
        GameEvent, QueuedCommand, Team, TickId, UnitId, UnitQuery, UnitRecord, UnitState, Vec2,
    };

    // Errors
    pub use skirmish_core::{CommandError, RuleError, StoreError};

    // Store
    pub use skirmish_store::UnitProxy;

    // Rules
    pub use skirmish_rule::{AbilityBook, Battlefield, Rule, RulePhase, TickContext};
    pub use skirmish_rules::{default_pipeline, pipeline_with_abilities};

    // Engine
    pub use skirmish_engine::{
        CommandExecutor, ExecContext, SimConfig, Simulator, StepMetrics, TemplateFactory,
        Transform, UnitChanges,
    };
}
