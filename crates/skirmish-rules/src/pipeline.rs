//! The stock rule pipeline.

use skirmish_rule::{AbilityBook, PairwiseBatch, Rule};

use crate::{
    AbilityRule, AiRule, AirborneRule, CleanupRule, MeleeHandler, MovementRule, ProjectileRule,
    SeparationRule, StatusEffectRule,
};

/// Every reference rule in phase order, with no abilities loaded.
pub fn default_pipeline() -> Vec<Box<dyn Rule>> {
    pipeline_with_abilities(AbilityBook::new())
}

/// [`default_pipeline`] with `book` driving the ability rule.
pub fn pipeline_with_abilities(book: AbilityBook) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(AiRule::new()),
        Box::new(AbilityRule::new(book)),
        Box::new(StatusEffectRule::new()),
        Box::new(MovementRule::new()),
        Box::new(SeparationRule::new()),
        Box::new(AirborneRule::new()),
        Box::new(PairwiseBatch::new("melee").with_handler(MeleeHandler::new())),
        Box::new(ProjectileRule::new()),
        Box::new(CleanupRule::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_rule::validate_pipeline;

    #[test]
    fn default_pipeline_is_valid() {
        let rules = default_pipeline();
        validate_pipeline(&rules).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "ai",
                "abilities",
                "status_effects",
                "movement",
                "separation",
                "airborne",
                "melee",
                "projectiles",
                "cleanup"
            ]
        );
    }
}
