//! Shared type definitions for the Colonies simulation.
//!
//! This crate is the single source of truth for the value types passed
//! between the transaction engine, the world model, and the colony core.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for citizens, buildings, colonies
//! - [`enums`] -- Block, material, item, surface and status enumerations
//! - [`structs`] -- Block positions, block states, item stacks, entity positions

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    BlockKind, CitizenStatus, ItemKind, Material, PathFindingStatus, SurfaceType, TreeVariety,
};
pub use ids::{BuildingId, CitizenId, ColonyId};
pub use structs::{BlockPos, BlockState, EntityPosition, ItemStack};
