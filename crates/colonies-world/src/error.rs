//! Error types for the `colonies-world` crate.

use colonies_types::BlockPos;

/// Errors that can occur during world queries and tree detection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A neighbouring position fell outside the coordinate range.
    #[error("position overflow next to {0}")]
    PositionOverflow(BlockPos),

    /// No tree stands at the given position.
    #[error("no tree at {0}")]
    TreeNotFound(BlockPos),

    /// The tree has more logs than the detection limit allows.
    #[error("tree at {location} exceeds {limit} logs")]
    TreeTooLarge {
        /// Base location of the tree.
        location: BlockPos,
        /// The configured log limit.
        limit: usize,
    },
}
