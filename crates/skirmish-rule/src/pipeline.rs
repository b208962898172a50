//! Startup-time pipeline validation.
//!
//! [`validate_pipeline`] checks a rule list once, before the first tick,
//! so an ordering mistake is a construction error instead of a subtle
//! gameplay bug.

use indexmap::IndexSet;

use crate::rule::{Rule, RulePhase};

use std::error::Error;
use std::fmt;

/// Errors from pipeline validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A rule is listed after a rule of a later phase.
    PhaseOrderViolation {
        /// The misplaced rule.
        rule: String,
        /// Its phase.
        phase: RulePhase,
        /// The rule before it.
        previous_rule: String,
        /// The earlier rule's (later) phase.
        previous_phase: RulePhase,
    },
    /// Two rules share a name.
    DuplicateRule {
        /// The repeated name.
        name: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseOrderViolation {
                rule,
                phase,
                previous_rule,
                previous_phase,
            } => write!(
                f,
                "rule '{rule}' ({phase}) cannot run after '{previous_rule}' ({previous_phase})"
            ),
            Self::DuplicateRule { name } => write!(f, "rule '{name}' registered twice"),
        }
    }
}

impl Error for PipelineError {}

/// Validate a rule pipeline.
///
/// Checks performed:
///
/// 1. Phases are non-decreasing in declaration order.
/// 2. Rule names are unique.
///
/// An empty pipeline is valid.
pub fn validate_pipeline(rules: &[Box<dyn Rule>]) -> Result<(), PipelineError> {
    let mut names: IndexSet<&str> = IndexSet::with_capacity(rules.len());
    let mut previous: Option<&dyn Rule> = None;

    for rule in rules {
        if !names.insert(rule.name()) {
            return Err(PipelineError::DuplicateRule {
                name: rule.name().to_string(),
            });
        }
        if let Some(prev) = previous {
            if rule.phase() < prev.phase() {
                return Err(PipelineError::PhaseOrderViolation {
                    rule: rule.name().to_string(),
                    phase: rule.phase(),
                    previous_rule: prev.name().to_string(),
                    previous_phase: prev.phase(),
                });
            }
        }
        previous = Some(rule.as_ref());
    }
    Ok(())
}
