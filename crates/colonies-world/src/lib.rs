//! The block world as the colony's workers see it.
//!
//! This crate models only what the colony logic asks of the host voxel
//! engine: reading block states, classifying blocks for pathfinding, finding
//! paths, and recognising trees.
//!
//! # Modules
//!
//! - [`access`] -- The [`BlockAccess`] trait and the sparse [`VoxelWorld`].
//! - [`error`] -- Error types for world queries and tree detection.
//! - [`pathing`] -- Pathing helpers and the ordered [`PathingHelperChain`].
//! - [`path_job`] -- Breadth-first [`PathJob`] driven by an injected chain.
//! - [`tree`] -- The [`Tree`] resource model polled by the lumberjack.
//! - [`tree_manager`] -- [`TreeManager`] detection and stump marking.

pub mod access;
pub mod error;
pub mod path_job;
pub mod pathing;
pub mod tree;
pub mod tree_manager;

// Re-export primary types at crate root.
pub use access::{BlockAccess, VoxelWorld};
pub use error::WorldError;
pub use path_job::{PathJob, PathResult};
pub use pathing::{
    ConstructionTapePathingHelper, FenceLikePathingHelper, FluidPathingHelper, PathingHelper,
    PathingHelperChain, SolidBlockPathingHelper,
};
pub use tree::Tree;
pub use tree_manager::TreeManager;
