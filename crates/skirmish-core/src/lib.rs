//! Core types and traits for the Skirmish battle simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Skirmish workspace:
//! identifiers, the canonical unit encodings, queued commands and events,
//! the read/write capability traits, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod id;
pub mod keys;
pub mod meta;
pub mod traits;
pub mod unit;

pub use command::{EventTarget, GameEvent, QueuedCommand};
pub use error::{CommandError, RuleError, StoreError};
pub use id::{ProjectileId, TickId, UnitId};
pub use meta::{merge_meta, merge_patch, Meta};
pub use traits::{UnitQuery, UnitWriter};
pub use unit::{ColdData, ProjectileKind, Team, UnitRecord, UnitState, Vec2};
