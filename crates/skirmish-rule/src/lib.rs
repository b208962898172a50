//! Rule trait, tick context and pipeline validation for Skirmish.
//!
//! A tick runs an ordered list of [`Rule`]s. Each rule gets a
//! [`TickContext`] with read-only access to the world and queues commands
//! for the engine to apply afterwards. [`validate_pipeline`] checks the
//! list once at construction; [`PairwiseBatch`] lets several combat
//! mechanics share one spatial pass.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ability;
pub mod context;
pub mod pairwise;
pub mod pipeline;
pub mod rule;

pub use ability::{
    AbilityBook, AbilitySpec, CompiledAbility, EffectDescriptor, TargetSelector, Trigger,
};
pub use context::{Battlefield, Checkpoint, TickContext, WeatherSnapshot};
pub use pairwise::{PairwiseBatch, PairwiseHandler, UnitPair};
pub use pipeline::{validate_pipeline, PipelineError};
pub use rule::{Rule, RulePhase};
