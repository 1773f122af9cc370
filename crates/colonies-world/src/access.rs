//! Read access to the block grid, and the in-process voxel world.
//!
//! Everything in this crate reads blocks through [`BlockAccess`], so the
//! pathing helpers and the tree detector work the same against the sparse
//! [`VoxelWorld`] used by the engine and against any host adapter.

use std::collections::BTreeMap;

use colonies_types::{BlockKind, BlockPos, BlockState};

/// Read-only view of the block grid.
pub trait BlockAccess {
    /// The state of the block at `pos`. Unloaded or unset positions read
    /// as air.
    fn block_state(&self, pos: BlockPos) -> BlockState;
}

/// Sparse block grid. Every position not stored reads as air.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoxelWorld {
    blocks: BTreeMap<BlockPos, BlockKind>,
}

impl VoxelWorld {
    /// Create an empty (all-air) world.
    pub const fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }

    /// The block kind at `pos`.
    pub fn block(&self, pos: BlockPos) -> BlockKind {
        self.blocks.get(&pos).copied().unwrap_or(BlockKind::Air)
    }

    /// Place `kind` at `pos`, returning the kind that was there.
    ///
    /// Placing air removes the stored entry.
    pub fn set_block(&mut self, pos: BlockPos, kind: BlockKind) -> BlockKind {
        let previous = if kind == BlockKind::Air {
            self.blocks.remove(&pos)
        } else {
            self.blocks.insert(pos, kind)
        };
        previous.unwrap_or(BlockKind::Air)
    }

    /// Replace the block at `pos` with air, returning what was there.
    pub fn break_block(&mut self, pos: BlockPos) -> BlockKind {
        self.set_block(pos, BlockKind::Air)
    }

    /// Fill the inclusive box spanned by two corners with `kind`.
    pub fn fill(&mut self, a: BlockPos, b: BlockPos, kind: BlockKind) {
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                for z in a.z.min(b.z)..=a.z.max(b.z) {
                    self.set_block(BlockPos::new(x, y, z), kind);
                }
            }
        }
    }

    /// The highest non-air block in the column at `(x, z)`, searched from
    /// `top` down to `bottom`.
    pub fn highest_block(&self, x: i32, z: i32, top: i32, bottom: i32) -> Option<BlockPos> {
        (bottom..=top)
            .rev()
            .map(|y| BlockPos::new(x, y, z))
            .find(|pos| self.blocks.contains_key(pos))
    }

    /// Number of non-air blocks stored.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the world holds nothing but air.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Count the stored blocks matching `predicate`.
    pub fn count_matching(&self, predicate: impl Fn(BlockKind) -> bool) -> usize {
        self.blocks.values().filter(|kind| predicate(**kind)).count()
    }

    /// Iterate over every stored (non-air) block in position order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockPos, BlockKind)> + '_ {
        self.blocks.iter().map(|(pos, kind)| (*pos, *kind))
    }
}

impl BlockAccess for VoxelWorld {
    fn block_state(&self, pos: BlockPos) -> BlockState {
        BlockState::of(self.block(pos))
    }
}
