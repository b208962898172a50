//! End-of-tick bookkeeping for dying and dead units.

use skirmish_core::{QueuedCommand, RuleError};
use skirmish_rule::{Rule, RulePhase, TickContext};

/// Kills units at or below zero hit points and removes dead ones.
///
/// A unit is killed on the tick its hp drops to zero and removed on the
/// following tick, so the body is still visible to every rule for one
/// tick.
#[derive(Debug, Default)]
pub struct CleanupRule;

impl CleanupRule {
    /// The rule.
    pub fn new() -> Self {
        Self
    }
}

impl Rule for CleanupRule {
    fn name(&self) -> &str {
        "cleanup"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Cleanup
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        Ok(ctx
            .units()
            .into_iter()
            .filter_map(|u| {
                if !u.is_alive() {
                    Some(QueuedCommand::new("remove").unit(u.id().clone()))
                } else if u.hp() <= 0.0 {
                    Some(QueuedCommand::new("kill").unit(u.id().clone()))
                } else {
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ctx;
    use skirmish_core::{UnitId, UnitState, UnitWriter};
    use skirmish_test_utils::{formation, projectiles};

    #[test]
    fn kills_the_dying_and_removes_the_dead() {
        let mut units = formation(1, 3);
        units.set_hp(&"r0c0".into(), 0.0);
        units.set_state(&"r0c1".into(), UnitState::Dead);
        let shots = projectiles(1);
        let mut c = ctx(&units, &shots, 0);
        let cmds = CleanupRule::new().execute(&mut c).unwrap();
        let got: Vec<_> = cmds
            .iter()
            .map(|c| (c.kind.as_str(), c.unit_id.clone()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("kill", Some(UnitId::from("r0c0"))),
                ("remove", Some(UnitId::from("r0c1")))
            ]
        );
    }
}
