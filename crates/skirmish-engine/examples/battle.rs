//! A small skirmish from scratch.
//!
//! Demonstrates:
//!   1. Loading unit templates and abilities from JSON
//!   2. Building a SimConfig with the stock rule pipeline
//!   3. Spawning both sides through `spawn` commands
//!   4. Stepping until one side is wiped out, reading metrics as we go
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example battle

use skirmish_core::{QueuedCommand, Team, UnitQuery};
use skirmish_engine::{SimConfig, Simulator, TemplateFactory};
use skirmish_rule::{AbilityBook, Battlefield};
use skirmish_rules::pipeline_with_abilities;

// ─── Content ────────────────────────────────────────────────────

const TEMPLATES: &str = r#"{
    "spearman": {"hp": 40, "damage": 6, "mass": 1, "tags": ["ai"]},
    "mage":     {"hp": 25, "damage": 2, "mass": 1, "tags": ["ai"], "abilities": ["firebolt", "mend"]},
    "orc":      {"hp": 55, "damage": 7, "mass": 2, "tags": ["ai"], "team": "hostile"}
}"#;

const ABILITIES: &str = r#"[
    {"name": "firebolt", "cooldown": 5, "range": 6, "target": "nearest_enemy",
     "effects": [{"type": "damage", "amount": 8},
                 {"type": "status", "status": "burn", "duration": 3, "amount": 2}]},
    {"name": "mend", "cooldown": 10, "range": 0, "target": "self",
     "effects": [{"type": "heal", "amount": 10}]}
]"#;

const MAX_TICKS: u64 = 200;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn spawn(unit_type: &str, x: f32, y: f32, team: Team) -> QueuedCommand {
    QueuedCommand::new("spawn")
        .param("unit_type", unit_type)
        .param("x", x)
        .param("y", y)
        .param("team", team.to_string())
}

fn headcount(sim: &Simulator, team: Team) -> usize {
    let units = sim.units();
    units
        .unit_ids()
        .iter()
        .filter(|id| units.team(id) == Some(team) && units.is_alive(id))
        .count()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let factory = TemplateFactory::from_json(TEMPLATES)?;
    let book = AbilityBook::from_json(ABILITIES)?;
    let config = SimConfig {
        field: Battlefield::new(24.0, 12.0),
        unit_capacity: 32,
        rules: pipeline_with_abilities(book),
        factory: Box::new(factory),
        seed: 42,
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(config)?;
    println!("pipeline: {}", sim.rule_names().join(" -> "));

    for row in 0..4 {
        let y = 3.0 + 2.0 * row as f32;
        sim.queue_command(spawn("spearman", 4.0, y, Team::Friendly));
        sim.queue_command(spawn("orc", 20.0, y, Team::Hostile));
    }
    sim.queue_command(spawn("mage", 2.0, 6.0, Team::Friendly));
    let report = sim.process_commands();
    println!("spawned {} units in {} passes", sim.units().len(), report.passes);

    while sim.current_tick().0 < MAX_TICKS {
        let metrics = sim.step();
        let tick = metrics.tick;
        let dispatched = metrics.commands_dispatched;
        let friendly = headcount(&sim, Team::Friendly);
        let hostile = headcount(&sim, Team::Hostile);
        if tick % 10 == 0 {
            println!(
                "tick {tick:>3}: {friendly} friendly, {hostile} hostile, {dispatched} commands"
            );
        }
        if friendly == 0 || hostile == 0 {
            let winner = if friendly > 0 { Team::Friendly } else { Team::Hostile };
            println!("tick {tick:>3}: {winner} side holds the field");
            return Ok(());
        }
    }
    println!("no winner after {MAX_TICKS} ticks");
    Ok(())
}
