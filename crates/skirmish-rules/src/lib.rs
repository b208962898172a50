//! Reference rules for the Skirmish battle simulation.
//!
//! Each rule reads the world through a [`TickContext`](skirmish_rule::TickContext)
//! and only ever emits commands or events.
//!
//! # Pipeline order (each tick)
//!
//! 1. [`AiRule`]: intended move toward the nearest enemy
//! 2. [`AbilityRule`]: ready abilities fire `effect` commands
//! 3. [`StatusEffectRule`]: burn, regen, stun and slow bookkeeping
//! 4. [`MovementRule`]: intended moves become `move` commands
//! 5. [`SeparationRule`]: overlapping units are pushed apart
//! 6. [`AirborneRule`]: jump arcs advance and land
//! 7. `PairwiseBatch` with [`MeleeHandler`]: adjacent enemies strike
//! 8. [`ProjectileRule`]: bullets fly and hit, bombs land
//! 9. [`CleanupRule`]: dying units are killed, dead ones removed

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ability;
pub mod ai;
pub mod cleanup;
pub mod melee;
pub mod movement;
pub mod pipeline;
pub mod projectile;
pub mod status;

pub use ability::AbilityRule;
pub use ai::AiRule;
pub use cleanup::CleanupRule;
pub use melee::MeleeHandler;
pub use movement::{AirborneRule, MovementRule, SeparationRule};
pub use pipeline::{default_pipeline, pipeline_with_abilities};
pub use projectile::ProjectileRule;
pub use status::StatusEffectRule;

#[cfg(test)]
pub(crate) mod testing {
    use skirmish_core::TickId;
    use skirmish_rule::{Battlefield, TickContext, WeatherSnapshot};
    use skirmish_store::{ProjectileStore, UnitManager};

    pub(crate) fn ctx<'a>(
        units: &'a UnitManager,
        projectiles: &'a ProjectileStore,
        tick: u64,
    ) -> TickContext<'a> {
        TickContext::new(
            units,
            projectiles,
            Battlefield::new(20.0, 20.0),
            WeatherSnapshot::default(),
            TickId(tick),
        )
    }
}
