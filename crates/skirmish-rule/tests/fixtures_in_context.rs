//! Fixture rules driven by hand through a `TickContext`.

use skirmish_core::{GameEvent, QueuedCommand, TickId};
use skirmish_rule::{
    validate_pipeline, Battlefield, PipelineError, Rule, RulePhase, TickContext, WeatherSnapshot,
};
use skirmish_test_utils::fixtures::{FailingRule, ProbeRule, ScriptedRule};
use skirmish_test_utils::{duel, projectiles};

#[test]
fn checkpoint_rollback_discards_failed_rule_output() {
    let units = duel(1.0, 50.0, 10.0);
    let projectiles = projectiles(1);
    let mut ctx = TickContext::new(
        &units,
        &projectiles,
        Battlefield::default(),
        WeatherSnapshot::default(),
        TickId(0),
    );

    let mut ok = ScriptedRule::new("ok", RulePhase::Ai)
        .queue(QueuedCommand::new("heal").unit("friend"))
        .raising(GameEvent::new("noise"));
    let mut bad = FailingRule::new("bad", QueuedCommand::new("kill").unit("friend"), 0);

    let returned = ok.execute(&mut ctx).unwrap();
    assert!(returned.is_empty());

    let cp = ctx.checkpoint();
    assert!(bad.execute(&mut ctx).is_err());
    ctx.rollback(cp);

    let (commands, events) = ctx.into_outbox();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].kind, "heal");
    assert_eq!(events[0].tick, Some(0));
}

#[test]
fn probe_sees_commands_queued_by_earlier_rules() {
    let units = duel(1.0, 50.0, 10.0);
    let projectiles = projectiles(1);
    let mut ctx = TickContext::new(
        &units,
        &projectiles,
        Battlefield::default(),
        WeatherSnapshot::default(),
        TickId(4),
    );
    let mut first = ScriptedRule::new("first", RulePhase::Ai)
        .queue(QueuedCommand::new("heal").unit("foe"))
        .queue(QueuedCommand::new("heal").unit("friend"));
    let mut probe = ProbeRule::new("probe", RulePhase::Movement, "foe");
    let log = probe.log();

    first.execute(&mut ctx).unwrap();
    probe.execute(&mut ctx).unwrap();

    let seen = log.borrow();
    assert_eq!(seen[0].tick, 4);
    assert_eq!(seen[0].hp, Some(50.0));
    assert_eq!(seen[0].queued_before, 2);
}

#[test]
fn fixture_pipeline_validation() {
    let good: Vec<Box<dyn Rule>> = vec![
        Box::new(ScriptedRule::new("a", RulePhase::Ai)),
        Box::new(FailingRule::new("b", QueuedCommand::new("kill"), 1)),
    ];
    assert!(validate_pipeline(&good).is_ok());

    let bad: Vec<Box<dyn Rule>> = vec![
        Box::new(FailingRule::new("b", QueuedCommand::new("kill"), 1)),
        Box::new(ScriptedRule::new("a", RulePhase::Abilities)),
    ];
    assert!(matches!(
        validate_pipeline(&bad),
        Err(PipelineError::PhaseOrderViolation { .. })
    ));
}
