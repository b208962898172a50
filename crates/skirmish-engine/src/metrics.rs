//! Per-tick metrics for the simulator.
//!
//! [`StepMetrics`] captures timing and queue counters for a single tick.
//! The cumulative counters at the end carry over from tick to tick.

/// Timing and queue metrics collected during a single tick.
///
/// All durations are in microseconds. The simulator populates these after
/// each `step()` call; read the latest with
/// [`Simulator::last_metrics()`](crate::Simulator::last_metrics).
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Tick these metrics describe.
    pub tick: u64,
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Per-rule execution times: `(name, microseconds)`.
    pub rule_us: Vec<(String, u64)>,
    /// Time spent in the command loop, in microseconds.
    pub command_processing_us: u64,
    /// Dispatch passes run by the command loop.
    pub passes: u32,
    /// Commands handed to an executor.
    pub commands_dispatched: u32,
    /// Commands dropped because an earlier one in the same pass had the
    /// same id.
    pub commands_deduplicated: u32,
    /// Commands folded into an earlier `meta` or `move` for the same unit.
    pub commands_coalesced: u32,
    /// Commands left waiting for a later tick.
    pub commands_deferred: u32,
    /// Commands dropped because no executor handles their kind.
    pub commands_rejected: u32,
    /// Executor calls that returned an error.
    pub command_errors: u32,
    /// Events turned into commands.
    pub events_translated: u32,
    /// Rules that failed this tick and were rolled back.
    pub rules_rolled_back: u32,
    /// Cumulative number of times the pass cap was hit.
    pub pass_cap_hits: u64,
    /// Cumulative number of rule failures.
    pub rule_failures: u64,
}
