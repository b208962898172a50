//! The [`Rule`] trait and [`RulePhase`] ordering.
//!
//! Rules are the per-tick game logic. Each one reads the world through a
//! [`TickContext`] and answers with commands; none of them mutate state.

use std::fmt;

use skirmish_core::{QueuedCommand, RuleError};

use crate::context::TickContext;

/// Coarse stage of the tick a rule belongs to.
///
/// A pipeline must list its rules in non-decreasing phase order; see
/// [`validate_pipeline`](crate::validate_pipeline).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RulePhase {
    /// Target selection and intended movement.
    Ai,
    /// Ability triggering.
    Abilities,
    /// Timed status effects.
    StatusEffects,
    /// Turning intent into motion.
    Movement,
    /// Melee resolution.
    Combat,
    /// Projectile flight and impact.
    Projectiles,
    /// Death and removal.
    Cleanup,
}

impl fmt::Display for RulePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ai => "ai",
            Self::Abilities => "abilities",
            Self::StatusEffects => "status_effects",
            Self::Movement => "movement",
            Self::Combat => "combat",
            Self::Projectiles => "projectiles",
            Self::Cleanup => "cleanup",
        };
        f.write_str(s)
    }
}

/// One stage of per-tick game logic.
///
/// # Contract
///
/// - `execute()` runs once per tick, in pipeline order.
/// - Mutations are requested, never performed: queue them through
///   [`TickContext::queue_command`] / [`TickContext::queue_event`], or
///   return them. Returned commands land after the ones queued through the
///   context during the same call.
/// - `&mut self` is for private bookkeeping such as cooldowns. Nothing
///   else can see it.
/// - On `Err`, everything the rule queued during that call is discarded
///   and the pipeline moves on to the next rule.
///
/// # Examples
///
/// ```
/// use skirmish_core::{QueuedCommand, RuleError};
/// use skirmish_rule::{Rule, RulePhase, TickContext};
///
/// struct HealAll { amount: f32 }
///
/// impl Rule for HealAll {
///     fn name(&self) -> &str { "heal_all" }
///     fn phase(&self) -> RulePhase { RulePhase::StatusEffects }
///
///     fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
///         Ok(ctx
///             .units()
///             .into_iter()
///             .filter(|u| u.is_alive())
///             .map(|u| {
///                 QueuedCommand::new("heal")
///                     .unit(u.id().clone())
///                     .param("amount", self.amount)
///             })
///             .collect())
///     }
/// }
///
/// let rule = HealAll { amount: 1.0 };
/// assert_eq!(rule.phase(), RulePhase::StatusEffects);
/// ```
pub trait Rule: 'static {
    /// Name used in logs, metrics and pipeline validation. Unique per
    /// pipeline.
    fn name(&self) -> &str;

    /// Stage this rule belongs to.
    fn phase(&self) -> RulePhase;

    /// Run one tick of this rule.
    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError>;
}
