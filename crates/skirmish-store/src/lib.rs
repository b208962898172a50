//! Entity storage for the Skirmish battle simulation.
//!
//! Units are split by access pattern:
//!
//! ```text
//! UnitManager
//! ├── UnitBlock   hot numeric attributes, one Vec per field, indexed by slot
//! ├── ColdStore   sparse map slot → ColdData (tags, meta, abilities, ...)
//! └── id ↔ slot   stable UnitId to the slot it currently occupies
//! ```
//!
//! Rules read units through [`UnitProxy`], a view that re-reads the store
//! on every call, or through the [`batch`] functions that scan the raw
//! arrays directly. [`ProjectileStore`] follows the same layout.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod block;
pub mod cold;
pub mod manager;
pub mod projectile;
pub mod proxy;
pub mod spatial;

pub use block::UnitBlock;
pub use cold::ColdStore;
pub use manager::UnitManager;
pub use projectile::{ProjectileBlock, ProjectileRecord, ProjectileStore};
pub use proxy::UnitProxy;
pub use spatial::SpatialGrid;
