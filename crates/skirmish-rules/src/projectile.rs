//! Projectile flight.

use serde_json::json;
use skirmish_core::{GameEvent, ProjectileId, ProjectileKind, QueuedCommand, RuleError};
use skirmish_rule::{Rule, RulePhase, TickContext};
use skirmish_store::ProjectileRecord;

/// Advances every projectile by one tick.
///
/// Bullets move by their velocity. The first living enemy within the
/// bullet's radius of its new position takes `damage` and the bullet is
/// removed; a bullet leaving the field is removed without effect.
///
/// Bombs advance `1 / duration` along the arc from origin to target, with
/// height `4 * arc_height * p * (1 - p)`. On landing they raise an `aoe`
/// event at the target that spares the firing team, and are removed.
#[derive(Debug)]
pub struct ProjectileRule {
    arc_height: f32,
}

impl ProjectileRule {
    /// Bombs peak at 3 tiles.
    pub fn new() -> Self {
        Self { arc_height: 3.0 }
    }

    /// Peak height of bomb arcs.
    pub fn with_arc_height(mut self, arc_height: f32) -> Self {
        self.arc_height = arc_height;
        self
    }
}

impl Default for ProjectileRule {
    fn default() -> Self {
        Self::new()
    }
}

fn remove(id: ProjectileId) -> QueuedCommand {
    QueuedCommand::new("projectile_remove").param("projectile", id.0)
}

fn bullet(
    id: ProjectileId,
    p: &ProjectileRecord,
    ctx: &TickContext<'_>,
    out: &mut Vec<QueuedCommand>,
) {
    let next = p.position + p.velocity;
    if !ctx.field().contains(next) {
        out.push(remove(id));
        return;
    }
    let hit = ctx
        .units_in_radius(next, p.radius)
        .into_iter()
        .find(|u| p.team.is_enemy_of(u.team()));
    match hit {
        Some(victim) => {
            let mut damage = QueuedCommand::new("damage")
                .unit(victim.id().clone())
                .param("amount", json!(p.damage));
            if let Some(source) = &p.source {
                damage = damage.param("source", source.as_str());
            }
            out.push(damage);
            out.push(remove(id));
        }
        None => out.push(
            QueuedCommand::new("projectile_update")
                .param("projectile", id.0)
                .param("x", json!(next.x))
                .param("y", json!(next.y)),
        ),
    }
}

impl Rule for ProjectileRule {
    fn name(&self) -> &str {
        "projectiles"
    }

    fn phase(&self) -> RulePhase {
        RulePhase::Projectiles
    }

    fn execute(&mut self, ctx: &mut TickContext<'_>) -> Result<Vec<QueuedCommand>, RuleError> {
        let store = ctx.projectiles();
        let mut out = Vec::new();
        for id in store.ids() {
            let Some(p) = store.get(id) else {
                continue;
            };
            match p.kind {
                ProjectileKind::Bullet => bullet(id, &p, ctx, &mut out),
                ProjectileKind::Bomb => {
                    let progress = p.progress + 1.0 / p.duration.max(1.0);
                    if progress >= 1.0 {
                        let mut blast = GameEvent::new("aoe")
                            .at_point(p.target)
                            .meta("radius", json!(p.aoe_radius))
                            .meta("amount", json!(p.damage))
                            .meta("team", p.team.to_string());
                        blast.source = p.source.clone();
                        ctx.queue_event(blast);
                        out.push(remove(id));
                        continue;
                    }
                    let at = p.origin + (p.target - p.origin) * progress;
                    let z = 4.0 * self.arc_height * progress * (1.0 - progress);
                    out.push(
                        QueuedCommand::new("projectile_update")
                            .param("projectile", id.0)
                            .param("x", json!(at.x))
                            .param("y", json!(at.y))
                            .param("z", json!(z))
                            .param("progress", json!(progress)),
                    );
                }
            }
        }
        Ok(out)
    }
}
