//! Error types for the Skirmish simulation, one enum per subsystem:
//! entity storage, command execution and rule execution.
//!
//! None of these halt a tick. Store errors are returned to the caller,
//! command and rule errors are logged by the engine and the tick carries
//! on.

use std::error::Error;
use std::fmt;

use crate::id::UnitId;

/// Errors from adding entities to a store.
///
/// A store returning one of these has not been modified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// Every slot is occupied.
    CapacityExceeded {
        /// Fixed capacity of the store.
        capacity: usize,
    },
    /// A unit with this id is already stored.
    DuplicateId {
        /// The conflicting id.
        id: UnitId,
    },
    /// Unit ids must be non-empty.
    EmptyId,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "store capacity of {capacity} exceeded")
            }
            Self::DuplicateId { id } => write!(f, "unit id '{id}' already in use"),
            Self::EmptyId => write!(f, "unit id must not be empty"),
        }
    }
}

impl Error for StoreError {}

/// Errors returned by command executors.
///
/// The command queue logs these and moves on; a failing command never
/// mutates state and never stops the pass.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandError {
    /// The command names a unit that is not in the store.
    UnknownUnit {
        /// The id that was not found.
        id: UnitId,
    },
    /// The command names a projectile that is not in the store.
    UnknownProjectile {
        /// The raw projectile id.
        id: u64,
    },
    /// A required parameter is absent.
    MissingParam {
        /// Command kind.
        kind: String,
        /// Name of the missing parameter.
        param: String,
    },
    /// A parameter is present but unusable (wrong type, NaN, negative, ...).
    InvalidParam {
        /// Command kind.
        kind: String,
        /// Name of the bad parameter.
        param: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The command does not apply to a dead unit.
    UnitDead {
        /// The dead unit.
        id: UnitId,
    },
    /// Adding an entity failed.
    Store(StoreError),
    /// The unit factory has no template with this name.
    UnknownTemplate {
        /// Requested unit type.
        unit_type: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUnit { id } => write!(f, "unknown unit '{id}'"),
            Self::UnknownProjectile { id } => write!(f, "unknown projectile p{id}"),
            Self::MissingParam { kind, param } => {
                write!(f, "'{kind}' command is missing '{param}'")
            }
            Self::InvalidParam {
                kind,
                param,
                reason,
            } => write!(f, "'{kind}' command has invalid '{param}': {reason}"),
            Self::UnitDead { id } => write!(f, "unit '{id}' is dead"),
            Self::Store(e) => write!(f, "store rejected entity: {e}"),
            Self::UnknownTemplate { unit_type } => {
                write!(f, "no unit template named '{unit_type}'")
            }
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Errors returned by a rule's `execute`.
///
/// The pipeline logs the error, discards whatever the rule queued during
/// that call, and continues with the next rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleError {
    /// The rule could not complete.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The rule found state it cannot work with.
    InvalidState {
        /// The unit involved, if any.
        unit: Option<UnitId>,
        /// What was wrong.
        reason: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::InvalidState {
                unit: Some(id),
                reason,
            } => write!(f, "invalid state for unit '{id}': {reason}"),
            Self::InvalidState { unit: None, reason } => {
                write!(f, "invalid state: {reason}")
            }
        }
    }
}

impl Error for RuleError {}
