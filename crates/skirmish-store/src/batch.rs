//! Bulk queries over the raw hot arrays.
//!
//! Each function here has a `*_by_proxy` twin that computes the same
//! answer through [`UnitProxy`] getters. The array versions are what the
//! rules call; the proxy versions are the readable reference and the two
//! are checked against each other in tests. Both visit units in slot
//! order and break ties toward the lower slot.

use skirmish_core::{UnitId, Vec2};

use crate::block::UnitBlock;
use crate::proxy::UnitProxy;
use crate::spatial::SpatialGrid;

// ── Nearest neighbour ──────────────────────────────────────────

fn nearest_matching(
    block: &UnitBlock,
    index: usize,
    accept: impl Fn(usize) -> bool,
) -> Option<usize> {
    if !block.is_alive(index) {
        return None;
    }
    let me = block.position(index);
    let mut best: Option<(usize, f32)> = None;
    for j in 0..block.capacity() {
        if j == index || !block.is_alive(j) || !accept(j) {
            continue;
        }
        let d = block.position(j).distance_squared(me);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((j, d));
        }
    }
    best.map(|(j, _)| j)
}

/// Closest living enemy of the unit in slot `index`.
pub fn nearest_enemy(block: &UnitBlock, index: usize) -> Option<usize> {
    let team = block.team_of(index);
    nearest_matching(block, index, |j| team.is_enemy_of(block.team_of(j)))
}

/// Closest living teammate of the unit in slot `index`.
pub fn nearest_ally(block: &UnitBlock, index: usize) -> Option<usize> {
    let team = block.team_of(index);
    nearest_matching(block, index, |j| block.team_of(j) == team)
}

fn nearest_proxy_matching<'a>(
    me: &UnitProxy<'a>,
    others: &[UnitProxy<'a>],
    accept: impl Fn(&UnitProxy<'a>) -> bool,
) -> Option<UnitProxy<'a>> {
    if !me.is_alive() {
        return None;
    }
    let pos = me.position();
    let mut best: Option<(UnitProxy<'a>, f32)> = None;
    for other in others {
        if other.id() == me.id() || !other.is_alive() || !accept(other) {
            continue;
        }
        let d = other.position().distance_squared(pos);
        if best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((*other, d));
        }
    }
    best.map(|(p, _)| p)
}

/// Proxy twin of [`nearest_enemy`]. `others` must be in slot order.
pub fn nearest_enemy_by_proxy<'a>(
    me: &UnitProxy<'a>,
    others: &[UnitProxy<'a>],
) -> Option<UnitProxy<'a>> {
    nearest_proxy_matching(me, others, |o| me.is_enemy_of(o))
}

/// Proxy twin of [`nearest_ally`]. `others` must be in slot order.
pub fn nearest_ally_by_proxy<'a>(
    me: &UnitProxy<'a>,
    others: &[UnitProxy<'a>],
) -> Option<UnitProxy<'a>> {
    nearest_proxy_matching(me, others, |o| o.team() == me.team())
}

// ── AI stepping ────────────────────────────────────────────────

fn approach(from: Vec2, to: Vec2, engage_range: f32, speed: f32) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= engage_range {
        return Vec2::ZERO;
    }
    delta.normalized() * speed.min(dist - engage_range)
}

/// Intended move for every living unit: one step of at most `speed`
/// toward its nearest enemy, stopping at `engage_range`. Units with no
/// enemy get a zero move.
pub fn ai_steps(block: &UnitBlock, engage_range: f32, speed: f32) -> Vec<(usize, Vec2)> {
    (0..block.capacity())
        .filter(|&i| block.is_alive(i))
        .map(|i| {
            let step = match nearest_enemy(block, i) {
                Some(j) => approach(block.position(i), block.position(j), engage_range, speed),
                None => Vec2::ZERO,
            };
            (i, step)
        })
        .collect()
}

/// Proxy twin of [`ai_steps`]. `units` must be in slot order.
pub fn ai_steps_by_proxy(
    units: &[UnitProxy<'_>],
    engage_range: f32,
    speed: f32,
) -> Vec<(UnitId, Vec2)> {
    units
        .iter()
        .filter(|u| u.is_alive())
        .map(|u| {
            let step = match nearest_enemy_by_proxy(u, units) {
                Some(e) => approach(u.position(), e.position(), engage_range, speed),
                None => Vec2::ZERO,
            };
            (u.id().clone(), step)
        })
        .collect()
}

// ── Separation ─────────────────────────────────────────────────

fn separation_push(pi: Vec2, pj: Vec2, min_distance: f32, strength: f32) -> Option<Vec2> {
    let delta = pj - pi;
    let d = delta.length();
    if d >= min_distance {
        return None;
    }
    let dir = if d > f32::EPSILON {
        delta * (1.0 / d)
    } else {
        Vec2::new(1.0, 0.0)
    };
    Some(dir * ((min_distance - d) * strength * 0.5))
}

/// Forces pushing overlapping living units apart.
///
/// Every pair closer than `min_distance` is pushed apart along the line
/// between them, proportionally to the overlap. Coincident units are split
/// along +x. Only units with a non-zero net force are returned, in slot
/// order.
pub fn separation_forces(
    block: &UnitBlock,
    grid: &SpatialGrid,
    min_distance: f32,
    strength: f32,
) -> Vec<(usize, Vec2)> {
    separation_forces_among(block, grid, min_distance, strength, |_| true)
}

/// [`separation_forces`] restricted to slots accepted by `takes_part`.
///
/// Rejected slots neither push nor get pushed.
pub fn separation_forces_among(
    block: &UnitBlock,
    grid: &SpatialGrid,
    min_distance: f32,
    strength: f32,
    takes_part: impl Fn(usize) -> bool,
) -> Vec<(usize, Vec2)> {
    let mut forces = vec![Vec2::ZERO; block.capacity()];
    // Padded; the exact cutoff is decided by `separation_push`.
    let reach = min_distance * 1.001 + 1e-4;
    for (i, j) in grid.pairs_within(block, reach) {
        if !takes_part(i) || !takes_part(j) {
            continue;
        }
        if let Some(push) =
            separation_push(block.position(i), block.position(j), min_distance, strength)
        {
            forces[i] = forces[i] - push;
            forces[j] = forces[j] + push;
        }
    }
    forces
        .into_iter()
        .enumerate()
        .filter(|(_, f)| *f != Vec2::ZERO)
        .collect()
}

/// Proxy twin of [`separation_forces`]. `units` must be in slot order.
pub fn separation_forces_by_proxy(
    units: &[UnitProxy<'_>],
    min_distance: f32,
    strength: f32,
) -> Vec<(UnitId, Vec2)> {
    let living: Vec<&UnitProxy<'_>> = units.iter().filter(|u| u.is_alive()).collect();
    let mut forces = vec![Vec2::ZERO; living.len()];
    for a in 0..living.len() {
        for b in (a + 1)..living.len() {
            if let Some(push) = separation_push(
                living[a].position(),
                living[b].position(),
                min_distance,
                strength,
            ) {
                forces[a] = forces[a] - push;
                forces[b] = forces[b] + push;
            }
        }
    }
    living
        .iter()
        .zip(forces)
        .filter(|(_, f)| *f != Vec2::ZERO)
        .map(|(u, f)| (u.id().clone(), f))
        .collect()
}
