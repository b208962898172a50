//! Command engine and tick loop for the Skirmish battle simulation.
//!
//! [`Simulator`] owns the unit and projectile stores, runs the rule
//! pipeline once per tick, and resolves every requested mutation through
//! the [`CommandQueue`]: a bounded fixpoint loop dispatching commands to
//! the executors in a [`CommandRegistry`]. Executors write only through a
//! [`Transform`]; events they raise are turned back into commands by an
//! [`EventTranslator`] before the tick ends.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod executors;
pub mod factory;
pub mod metrics;
pub mod queue;
pub mod registry;
pub mod simulator;
pub mod transform;
pub mod translator;
pub mod weather;

pub use config::{CombatTuning, ConfigError, QueueConfig, SimConfig, WeatherConfig};
pub use factory::{FactoryError, TemplateFactory, UnitFactory, UnitTemplate};
pub use metrics::StepMetrics;
pub use queue::{CommandQueue, QueueReport, QueueWarning};
pub use registry::{CommandExecutor, CommandRegistry, FnExecutor};
pub use simulator::Simulator;
pub use transform::{ExecContext, Transform, UnitChanges};
pub use translator::{EventTranslator, StandardTranslator};
pub use weather::Weather;
