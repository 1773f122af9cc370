//! Core value structs: block positions, block states, item stacks, and
//! entity positions.
//!
//! All arithmetic on coordinates and counts is checked. Operations that
//! could leave the representable range return `None` instead of wrapping.

use serde::{Deserialize, Serialize};

use crate::enums::{BlockKind, ItemKind, Material};

// ---------------------------------------------------------------------------
// BlockPos
// ---------------------------------------------------------------------------

/// Integer coordinates of a block in the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Create a position from its coordinates.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Return the position shifted by the given deltas, or `None` if any
    /// coordinate would overflow.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add(dy) else {
            return None;
        };
        let Some(z) = self.z.checked_add(dz) else {
            return None;
        };
        Some(Self { x, y, z })
    }

    /// The position directly above.
    pub const fn up(self) -> Option<Self> {
        self.offset(0, 1, 0)
    }

    /// The position directly below.
    pub const fn down(self) -> Option<Self> {
        self.offset(0, -1, 0)
    }

    /// Squared Euclidean distance to another position.
    ///
    /// Saturates at `u64::MAX` for positions at opposite ends of the
    /// coordinate range.
    pub fn distance_sq(self, other: Self) -> u64 {
        let dx = i64::from(self.x).abs_diff(i64::from(other.x));
        let dy = i64::from(self.y).abs_diff(i64::from(other.y));
        let dz = i64::from(self.z).abs_diff(i64::from(other.z));
        dx.saturating_mul(dx)
            .saturating_add(dy.saturating_mul(dy))
            .saturating_add(dz.saturating_mul(dz))
    }

    /// The four horizontally adjacent positions (east, west, south, north).
    ///
    /// Neighbours that would overflow are omitted.
    pub fn horizontal_neighbors(self) -> impl Iterator<Item = Self> {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .filter_map(move |(dx, dz)| self.offset(dx, 0, dz))
    }
}

impl core::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// BlockState
// ---------------------------------------------------------------------------

/// The state of a single block as reported by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    /// The block type.
    pub kind: BlockKind,
}

impl BlockState {
    /// The state of an empty block.
    pub const AIR: Self = Self::of(BlockKind::Air);

    /// Create the default state of a block kind.
    pub const fn of(kind: BlockKind) -> Self {
        Self { kind }
    }

    /// The material of the block.
    pub const fn material(self) -> Material {
        self.kind.material()
    }

    /// Whether the block is air.
    pub const fn is_air(self) -> bool {
        matches!(self.kind, BlockKind::Air)
    }
}

impl Default for BlockState {
    fn default() -> Self {
        Self::AIR
    }
}

// ---------------------------------------------------------------------------
// ItemStack
// ---------------------------------------------------------------------------

/// A stack of identical items occupying one inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// What the stack holds.
    pub item: ItemKind,
    /// How many items the stack holds.
    pub count: u32,
}

impl ItemStack {
    /// Create a stack of `count` items.
    pub const fn new(item: ItemKind, count: u32) -> Self {
        Self { item, count }
    }

    /// Whether the stack holds no items.
    pub const fn is_empty(self) -> bool {
        self.count == 0
    }

    /// The same item with a different count.
    #[must_use]
    pub const fn with_count(self, count: u32) -> Self {
        Self {
            item: self.item,
            count,
        }
    }

    /// The largest count a slot may hold of this stack's item.
    pub const fn max_stack_size(self) -> u32 {
        self.item.max_stack_size()
    }

    /// Whether this stack can merge with another (same item kind).
    pub fn is_same_item(self, other: Self) -> bool {
        self.item == other.item
    }

    /// Split off up to `amount` items into a new stack.
    ///
    /// Returns `None` when nothing was split (empty stack or zero amount).
    pub fn split(&mut self, amount: u32) -> Option<Self> {
        let taken = amount.min(self.count);
        if taken == 0 {
            return None;
        }
        self.count = self.count.checked_sub(taken)?;
        Some(self.with_count(taken))
    }
}

// ---------------------------------------------------------------------------
// EntityPosition
// ---------------------------------------------------------------------------

/// Fractional world position of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityPosition {
    /// East-west coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl EntityPosition {
    /// Create a position from its coordinates.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The position at the centre of a block's bottom face.
    pub fn centered_on(pos: BlockPos) -> Self {
        Self {
            x: f64::from(pos.x) + 0.5,
            y: f64::from(pos.y),
            z: f64::from(pos.z) + 0.5,
        }
    }

    /// Offset of the entity along X within its block, in `[0, 1)`.
    pub fn block_offset_x(self) -> f64 {
        self.x - self.x.floor()
    }

    /// Offset of the entity along Z within its block, in `[0, 1)`.
    pub fn block_offset_z(self) -> f64 {
        self.z - self.z.floor()
    }

    /// The block the entity is standing in.
    ///
    /// Coordinates outside the `i32` range saturate.
    #[allow(clippy::cast_possible_truncation)]
    pub fn block_pos(self) -> BlockPos {
        // `as` from f64 to i32 saturates and maps NaN to 0.
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}
