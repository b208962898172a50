//! Bounded fixpoint command queue.
//!
//! [`CommandQueue`] buffers commands and events between rule execution
//! and mutation. [`process()`](CommandQueue::process) runs dispatch passes
//! until nothing ready is left or the pass cap is reached.
//!
//! # One pass
//!
//! 1. Split pending commands into ready (`tick` absent or due) and
//!    deferred. Deferred commands wait untouched.
//! 2. Drop ready commands whose `id` was already seen this pass.
//! 3. Fold `meta` commands per unit into one patch and keep only the last
//!    `move` per unit. A folded command sits where that unit's first one
//!    was.
//! 4. Group the rest by kind, groups in order of first appearance, and
//!    hand each group to its executor. Commands the executors enqueue
//!    wait for the next pass.
//! 5. Translate every pending event into commands, record the event as
//!    processed, and clear the event list.
//!
//! Hitting the cap is not an error: the ready remainder rolls over to the
//! next tick, pending events are still translated, and the report carries
//! a [`QueueWarning::PassCapExceeded`].

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use skirmish_core::{merge_patch, GameEvent, QueuedCommand, TickId, UnitId};
use tracing::{trace, warn};

use crate::registry::CommandRegistry;
use crate::transform::ExecContext;
use crate::translator::EventTranslator;

// ── QueueReport ────────────────────────────────────────────────────

/// Recoverable conditions raised by one `process()` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueWarning {
    /// The pass cap was reached with work left.
    PassCapExceeded {
        /// Tick being processed.
        tick: u64,
        /// The configured cap.
        max_passes: usize,
        /// Ready commands rolled over to the next tick.
        remaining: usize,
    },
}

impl fmt::Display for QueueWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassCapExceeded {
                tick,
                max_passes,
                remaining,
            } => write!(
                f,
                "tick {tick}: pass cap of {max_passes} reached with {remaining} commands left"
            ),
        }
    }
}

/// Counters from one `process()` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueReport {
    /// Dispatch passes run.
    pub passes: u32,
    /// Commands handed to an executor.
    pub dispatched: u32,
    /// Commands dropped as same-pass duplicates by id.
    pub deduplicated: u32,
    /// Commands folded into an earlier `meta` or `move`.
    pub coalesced: u32,
    /// Commands still waiting for their tick afterwards.
    pub deferred: u32,
    /// Commands with no registered executor.
    pub rejected: u32,
    /// Executor calls that returned an error.
    pub errors: u32,
    /// Events translated.
    pub events_translated: u32,
    /// Recoverable conditions.
    pub warnings: Vec<QueueWarning>,
}

impl QueueReport {
    /// Whether the pass cap was hit.
    pub fn hit_pass_cap(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, QueueWarning::PassCapExceeded { .. }))
    }
}

// ── CommandQueue ───────────────────────────────────────────────────

/// Pending commands and events.
#[derive(Debug)]
pub struct CommandQueue {
    pending: Vec<QueuedCommand>,
    events: Vec<GameEvent>,
    processed: Vec<GameEvent>,
    max_passes: usize,
}

impl CommandQueue {
    /// An empty queue running at most `max_passes` passes per call.
    pub fn new(max_passes: usize) -> Self {
        Self {
            pending: Vec::new(),
            events: Vec::new(),
            processed: Vec::new(),
            max_passes,
        }
    }

    /// The pass cap.
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Append a command.
    pub fn push(&mut self, command: QueuedCommand) {
        self.pending.push(command);
    }

    /// Append commands, keeping their order.
    pub fn extend(&mut self, commands: impl IntoIterator<Item = QueuedCommand>) {
        self.pending.extend(commands);
    }

    /// Append an event. The caller stamps its tick.
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Append events.
    pub fn extend_events(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        self.events.extend(events);
    }

    /// Commands waiting, deferred and rolled-over ones included.
    pub fn pending(&self) -> &[QueuedCommand] {
        &self.pending
    }

    /// Events waiting for translation.
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Events translated during the last `process()` call.
    pub fn processed_events(&self) -> &[GameEvent] {
        &self.processed
    }

    /// Run passes at `tick` until nothing ready is left or the cap is hit.
    pub fn process(
        &mut self,
        tick: TickId,
        registry: &mut CommandRegistry,
        translator: &mut dyn EventTranslator,
        ctx: &mut ExecContext<'_>,
    ) -> QueueReport {
        self.processed.clear();
        let mut report = QueueReport::default();
        let mut deferred = Vec::new();

        loop {
            let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|c| c.is_ready(tick));
            deferred.extend(waiting);

            if ready.is_empty() && self.events.is_empty() {
                break;
            }
            if report.passes as usize >= self.max_passes {
                let remaining = ready.len();
                warn!(
                    tick = tick.0,
                    max_passes = self.max_passes,
                    remaining,
                    "command pass cap reached; remaining commands roll over to the next tick"
                );
                report.warnings.push(QueueWarning::PassCapExceeded {
                    tick: tick.0,
                    max_passes: self.max_passes,
                    remaining,
                });
                self.pending = ready;
                self.translate_events(translator, &mut report);
                break;
            }

            report.passes += 1;
            let groups = coalesce(ready, &mut report);
            trace!(
                tick = tick.0,
                pass = report.passes,
                kinds = groups.len(),
                "dispatching"
            );
            for (kind, commands) in groups {
                let Some(executor) = registry.get_mut(&kind) else {
                    warn!(
                        kind = %kind,
                        count = commands.len(),
                        "no executor for command kind; dropped"
                    );
                    report.rejected += commands.len() as u32;
                    continue;
                };
                report.dispatched += commands.len() as u32;
                for (i, error) in executor.execute_batch(&commands, ctx) {
                    let unit = commands[i].unit_id.as_ref().map(UnitId::as_str);
                    warn!(kind = %kind, unit = ?unit, error = %error, "command failed");
                    report.errors += 1;
                }
            }

            self.pending = ctx.take_enqueued();
            self.events.extend(ctx.take_events());
            self.translate_events(translator, &mut report);
        }

        report.deferred = deferred.len() as u32;
        deferred.append(&mut self.pending);
        self.pending = deferred;
        report
    }

    fn translate_events(&mut self, translator: &mut dyn EventTranslator, report: &mut QueueReport) {
        for event in std::mem::take(&mut self.events) {
            self.pending.extend(translator.translate(&event));
            report.events_translated += 1;
            self.processed.push(event);
        }
    }
}

/// Dedup, fold and group one pass's ready commands.
fn coalesce(
    ready: Vec<QueuedCommand>,
    report: &mut QueueReport,
) -> IndexMap<String, Vec<QueuedCommand>> {
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut slots: Vec<QueuedCommand> = Vec::with_capacity(ready.len());
    let mut meta_slot: IndexMap<UnitId, usize> = IndexMap::new();
    let mut move_slot: IndexMap<UnitId, usize> = IndexMap::new();

    for cmd in ready {
        if let Some(id) = &cmd.id {
            if !seen.insert(id.clone()) {
                report.deduplicated += 1;
                continue;
            }
        }
        let slot_map = match cmd.kind.as_str() {
            "meta" => Some(&mut meta_slot),
            "move" => Some(&mut move_slot),
            _ => None,
        };
        match (slot_map, cmd.unit_id.clone()) {
            (Some(map), Some(unit)) => match map.get(&unit) {
                Some(&i) => {
                    if cmd.kind == "meta" {
                        fold_meta(&mut slots[i], &cmd);
                    } else {
                        slots[i] = cmd;
                    }
                    report.coalesced += 1;
                }
                None => {
                    map.insert(unit, slots.len());
                    slots.push(cmd);
                }
            },
            _ => slots.push(cmd),
        }
    }

    let mut groups: IndexMap<String, Vec<QueuedCommand>> = IndexMap::new();
    for cmd in slots {
        groups.entry(cmd.kind.clone()).or_default().push(cmd);
    }
    groups
}

/// Fold `later`'s `meta` patch into `earlier`'s, keeping delete markers.
fn fold_meta(earlier: &mut QueuedCommand, later: &QueuedCommand) {
    let Some(Value::Object(patch)) = later.params.get("meta") else {
        return;
    };
    match earlier.params.get_mut("meta") {
        Some(Value::Object(base)) => merge_patch(base, patch),
        _ => {
            earlier
                .params
                .insert("meta".to_string(), Value::Object(patch.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> QueueReport {
        QueueReport::default()
    }

    fn kinds(groups: &IndexMap<String, Vec<QueuedCommand>>) -> Vec<(&str, usize)> {
        groups.iter().map(|(k, v)| (k.as_str(), v.len())).collect()
    }

    #[test]
    fn duplicate_ids_keep_the_first() {
        let mut r = report();
        let groups = coalesce(
            vec![
                QueuedCommand::new("damage").unit("a").param("amount", 1).with_id("x"),
                QueuedCommand::new("damage").unit("a").param("amount", 2).with_id("x"),
                QueuedCommand::new("damage").unit("a").param("amount", 3),
            ],
            &mut r,
        );
        assert_eq!(r.deduplicated, 1);
        let amounts: Vec<_> = groups["damage"]
            .iter()
            .filter_map(|c| c.f32_param("amount"))
            .collect();
        assert_eq!(amounts, vec![1.0, 3.0]);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let mut r = report();
        let groups = coalesce(
            vec![
                QueuedCommand::new("heal").unit("a"),
                QueuedCommand::new("damage").unit("b"),
                QueuedCommand::new("heal").unit("c"),
            ],
            &mut r,
        );
        assert_eq!(kinds(&groups), vec![("heal", 2), ("damage", 1)]);
    }

    #[test]
    fn moves_are_last_write_wins_per_unit() {
        let mut r = report();
        let groups = coalesce(
            vec![
                QueuedCommand::new("move").unit("a").param("dx", 1),
                QueuedCommand::new("move").unit("b").param("dx", 5),
                QueuedCommand::new("move").unit("a").param("dx", 2),
            ],
            &mut r,
        );
        assert_eq!(r.coalesced, 1);
        let moves = &groups["move"];
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].unit_id, Some(UnitId::from("a")));
        assert_eq!(moves[0].f32_param("dx"), Some(2.0));
    }

    #[test]
    fn meta_patches_fold_with_delete_markers() {
        let mut r = report();
        let groups = coalesce(
            vec![
                QueuedCommand::new("meta").unit("a").param("meta", json!({"x": 1, "y": 1})),
                QueuedCommand::new("meta").unit("a").param("meta", json!({"y": null, "z": 3})),
            ],
            &mut r,
        );
        let metas = &groups["meta"];
        assert_eq!(metas.len(), 1);
        assert_eq!(
            metas[0].params["meta"],
            json!({"x": 1, "y": null, "z": 3})
        );
    }

    #[test]
    fn pass_cap_warning_displays() {
        let w = QueueWarning::PassCapExceeded {
            tick: 3,
            max_passes: 10,
            remaining: 11,
        };
        assert!(w.to_string().contains("pass cap of 10"));
        let r = QueueReport {
            warnings: vec![w],
            ..QueueReport::default()
        };
        assert!(r.hit_pass_cap());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn arb_cmd() -> impl Strategy<Value = QueuedCommand> {
            (
                prop::sample::select(vec!["move", "meta", "damage", "heal"]),
                prop::sample::select(vec!["a", "b", "c"]),
                prop::option::of(prop::sample::select(vec!["i1", "i2", "i3"])),
            )
                .prop_map(|(kind, unit, id)| {
                    let mut c = QueuedCommand::new(kind).unit(unit);
                    if kind == "meta" {
                        c = c.param("meta", json!({unit: 1}));
                    }
                    if let Some(id) = id {
                        c = c.with_id(id);
                    }
                    c
                })
        }

        proptest! {
            #[test]
            fn every_command_is_accounted_for(cmds in prop::collection::vec(arb_cmd(), 0..40)) {
                let n = cmds.len() as u32;
                let mut r = report();
                let groups = coalesce(cmds, &mut r);
                let kept: u32 = groups.values().map(|v| v.len() as u32).sum();
                prop_assert_eq!(kept + r.deduplicated + r.coalesced, n);
            }

            #[test]
            fn at_most_one_move_and_meta_per_unit(cmds in prop::collection::vec(arb_cmd(), 0..40)) {
                let mut r = report();
                let groups = coalesce(cmds, &mut r);
                for kind in ["move", "meta"] {
                    if let Some(v) = groups.get(kind) {
                        let units: IndexSet<_> =
                            v.iter().filter_map(|c| c.unit_id.clone()).collect();
                        prop_assert_eq!(units.len(), v.len());
                    }
                }
            }

            #[test]
            fn ids_are_unique_after_dedup(cmds in prop::collection::vec(arb_cmd(), 0..40)) {
                let mut r = report();
                let groups = coalesce(cmds, &mut r);
                let ids: Vec<_> = groups.values().flatten().filter_map(|c| c.id.clone()).collect();
                let unique: IndexSet<_> = ids.iter().cloned().collect();
                prop_assert_eq!(unique.len(), ids.len());
            }
        }
    }
}
