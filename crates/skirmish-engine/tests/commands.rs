//! Command queue semantics observed through the simulator.

use serde_json::json;
use skirmish_core::{
    EventTarget, GameEvent, QueuedCommand, TickId, UnitQuery, UnitRecord, UnitState, Vec2,
};
use skirmish_engine::{ExecContext, FnExecutor, SimConfig, Simulator, TemplateFactory};
use skirmish_store::UnitManager;
use skirmish_test_utils::{duel, SAMPLE_TEMPLATES};

fn load(units: &UnitManager, config: SimConfig) -> Simulator {
    let mut sim = Simulator::new(config).unwrap();
    for id in units.unit_ids() {
        sim.add_unit(units.record(&id).unwrap()).unwrap();
    }
    sim
}

fn duel_sim() -> Simulator {
    load(&duel(3.0, 50.0, 10.0), SimConfig::default())
}

fn snapshot(sim: &Simulator) -> Vec<UnitRecord> {
    let units = sim.units();
    units
        .unit_ids()
        .iter()
        .filter_map(|id| units.record(id))
        .collect()
}

fn hp(sim: &Simulator, id: &str) -> f32 {
    sim.unit(&id.into()).unwrap().hp()
}

fn step_east(unit: &str, dx: f64) -> QueuedCommand {
    QueuedCommand::new("move").unit(unit).param("dx", dx).param("dy", 0.0)
}

fn damage(unit: &str, amount: f32) -> QueuedCommand {
    QueuedCommand::new("damage")
        .unit(unit)
        .param("amount", json!(amount))
}

#[test]
fn unknown_target_leaves_store_unchanged() {
    let mut sim = duel_sim();
    let before = snapshot(&sim);
    sim.queue_command(damage("ghost", 10.0));
    sim.queue_command(step_east("ghost", 1.0));
    let report = sim.process_commands();
    assert_eq!(report.errors, 2);
    assert_eq!(snapshot(&sim), before);
}

#[test]
fn duplicate_ids_apply_first_only() {
    let mut sim = duel_sim();
    sim.queue_command(damage("foe", 5.0).with_id("volley"));
    sim.queue_command(damage("foe", 7.0).with_id("volley"));
    sim.queue_command(damage("foe", 1.0));
    let report = sim.process_commands();
    assert_eq!(report.deduplicated, 1);
    assert_eq!(hp(&sim, "foe"), 44.0);
}

#[test]
fn meta_patches_union_and_delete() {
    let mut sim = duel_sim();
    sim.queue_command(
        QueuedCommand::new("meta")
            .unit("friend")
            .param("meta", json!({"a": 1, "b": 2})),
    );
    sim.process_commands();
    sim.queue_command(
        QueuedCommand::new("meta")
            .unit("friend")
            .param("meta", json!({"b": null, "c": 3})),
    );
    sim.process_commands();

    let friend = sim.unit(&"friend".into()).unwrap();
    assert_eq!(friend.meta("a"), Some(&json!(1)));
    assert_eq!(friend.meta("b"), None);
    assert_eq!(friend.meta("c"), Some(&json!(3)));
}

#[test]
fn meta_patches_in_one_pass_fold_in_order() {
    let mut sim = duel_sim();
    for patch in [json!({"mood": "calm"}), json!({"mood": "angry", "x": 1})] {
        sim.queue_command(QueuedCommand::new("meta").unit("friend").param("meta", patch));
    }
    let report = sim.process_commands();
    assert_eq!(report.coalesced, 1);
    let friend = sim.unit(&"friend".into()).unwrap();
    assert_eq!(friend.meta("mood"), Some(&json!("angry")));
    assert_eq!(friend.meta("x"), Some(&json!(1)));
}

#[test]
fn last_move_for_a_unit_wins() {
    let mut sim = duel_sim();
    for dx in [1.0, 3.0] {
        sim.queue_command(step_east("friend", dx));
    }
    let report = sim.process_commands();
    assert_eq!(report.coalesced, 1);
    let friend = sim.unit(&"friend".into()).unwrap();
    assert_eq!(friend.position(), Vec2::new(8.0, 5.0));
}

#[test]
fn damage_floors_at_zero_and_heal_caps_at_max() {
    let mut sim = duel_sim();
    sim.queue_command(damage("friend", 30.0));
    sim.process_commands();
    assert_eq!(hp(&sim, "friend"), 20.0);

    sim.queue_command(QueuedCommand::new("heal").unit("friend").param("amount", 100.0));
    sim.process_commands();
    assert_eq!(hp(&sim, "friend"), 50.0);

    sim.queue_command(damage("foe", 80.0));
    sim.process_commands();
    let foe = sim.unit(&"foe".into()).unwrap();
    assert_eq!(foe.hp(), 0.0);
    assert_eq!(foe.state(), UnitState::Dead);

    sim.queue_command(QueuedCommand::new("heal").unit("foe").param("amount", 10.0));
    sim.process_commands();
    assert_eq!(hp(&sim, "foe"), 0.0);
}

#[test]
fn unknown_kinds_are_rejected() {
    let mut sim = duel_sim();
    sim.queue_command(QueuedCommand::new("teleport_home").unit("friend"));
    let report = sim.process_commands();
    assert_eq!(report.rejected, 1);
    assert_eq!(report.dispatched, 0);
}

#[test]
fn deferred_commands_fire_on_their_tick() {
    let mut sim = duel_sim();
    sim.queue_command(damage("foe", 5.0).at_tick(2));

    let metrics = sim.step().clone();
    assert_eq!(metrics.commands_deferred, 1);
    assert_eq!(sim.pending_commands().len(), 1);
    sim.step();
    assert_eq!(hp(&sim, "foe"), 50.0);

    sim.step();
    assert_eq!(hp(&sim, "foe"), 45.0);
    assert!(sim.pending_commands().is_empty());
    assert_eq!(sim.current_tick(), TickId(3));
}

#[test]
fn self_replicating_commands_stop_at_the_pass_cap() {
    let mut sim = duel_sim();
    sim.register_executor(
        "replicate",
        FnExecutor::new(|cmd: &QueuedCommand, ctx: &mut ExecContext<'_>| {
            ctx.enqueue(cmd.clone());
            Ok(())
        }),
    );
    for _ in 0..11 {
        sim.queue_command(QueuedCommand::new("replicate"));
    }

    let metrics = sim.step().clone();
    assert_eq!(metrics.passes, 10);
    assert_eq!(metrics.commands_dispatched, 110);
    assert_eq!(metrics.pass_cap_hits, 1);
    assert_eq!(sim.last_report().warnings.len(), 1);
    assert_eq!(sim.pending_commands().len(), 11);
}

#[test]
fn events_never_outlive_their_tick() {
    let mut sim = duel_sim();
    sim.queue_event(
        GameEvent::new("damage")
            .on_unit("foe")
            .meta("amount", 5.0),
    );
    sim.step();
    let kinds: Vec<_> = sim
        .processed_events()
        .iter()
        .map(|e| e.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["damage", "damaged"]);
    assert!(sim.processed_events().iter().all(|e| e.tick == Some(0)));
    assert_eq!(hp(&sim, "foe"), 45.0);

    sim.step();
    assert!(sim.processed_events().is_empty());
    assert_eq!(hp(&sim, "foe"), 45.0);
}

#[test]
fn aoe_event_spares_the_named_team() {
    let mut sim = duel_sim();
    sim.queue_event(
        GameEvent::new("aoe")
            .at_point(Vec2::new(6.5, 5.0))
            .meta("radius", 3.0)
            .meta("amount", 4.0)
            .meta("team", "friendly"),
    );
    sim.process_commands();
    assert_eq!(hp(&sim, "friend"), 50.0);
    assert_eq!(hp(&sim, "foe"), 46.0);
    assert!(matches!(
        sim.processed_events()[0].target,
        Some(EventTarget::Point(_))
    ));
}

#[test]
fn spawning_past_capacity_mutates_nothing() {
    let config = SimConfig {
        unit_capacity: 2,
        factory: Box::new(TemplateFactory::from_json(SAMPLE_TEMPLATES).unwrap()),
        ..SimConfig::default()
    };
    let mut sim = load(&duel(3.0, 50.0, 10.0), config);
    let before = snapshot(&sim);
    sim.queue_command(
        QueuedCommand::new("spawn")
            .param("unit_type", "grunt")
            .param("x", 2.0)
            .param("y", 2.0),
    );
    let report = sim.process_commands();
    assert_eq!(report.errors, 1);
    assert_eq!(snapshot(&sim), before);
    assert!(sim.processed_events().iter().all(|e| e.kind != "unit_spawned"));
}

#[test]
fn spawn_places_a_templated_unit() {
    let config = SimConfig {
        factory: Box::new(TemplateFactory::from_json(SAMPLE_TEMPLATES).unwrap()),
        ..SimConfig::default()
    };
    let mut sim = load(&duel(3.0, 50.0, 10.0), config);
    sim.queue_command(
        QueuedCommand::new("spawn")
            .unit("foe")
            .param("unit_type", "brute")
            .param("x", 2.0)
            .param("y", 2.0)
            .param("id", "big"),
    );
    let report = sim.process_commands();
    assert_eq!(report.errors, 0);
    let big = sim.unit(&"big".into()).unwrap();
    assert_eq!(big.max_hp(), 80.0);
    assert_eq!(big.team(), skirmish_core::Team::Hostile);
    assert_eq!(big.position(), Vec2::new(2.0, 2.0));
}
