//! Enumeration types for the Colonies simulation.
//!
//! Block and item classifications mirror the subset of the host voxel
//! engine that the colony logic needs to reason about: which blocks are
//! trees, which are liquids, which block movement, and which items stack.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

/// The wood variety of a tree, its logs, leaves, and saplings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TreeVariety {
    /// Oak trees.
    Oak,
    /// Spruce trees.
    Spruce,
    /// Birch trees.
    Birch,
    /// Jungle trees.
    Jungle,
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// The physical material a block is made of.
///
/// Materials answer the three questions the pathing helpers ask of the
/// host engine: is it liquid, is it solid, does it block movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Material {
    /// Empty space.
    Air,
    /// Dirt, grass, and other soil.
    Ground,
    /// Stone and cobblestone walls.
    Rock,
    /// Loose sand.
    Sand,
    /// Logs, planks, fences, doors.
    Wood,
    /// Tree foliage.
    Leaves,
    /// Saplings, tall grass, crops.
    Plants,
    /// Cloth-like markers such as construction tape.
    Cloth,
    /// Still or flowing water.
    Water,
    /// Still or flowing lava.
    Lava,
}

impl Material {
    /// Whether the material is a liquid.
    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }

    /// Whether the material forms a solid top surface.
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Self::Ground | Self::Rock | Self::Sand | Self::Wood | Self::Leaves | Self::Cloth
        )
    }

    /// Whether an entity is stopped when it tries to move through the
    /// material.
    pub const fn blocks_movement(self) -> bool {
        self.is_solid()
    }
}

/// The type of a block in the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Empty space.
    Air,
    /// Natural stone.
    Stone,
    /// Bare dirt.
    Dirt,
    /// Grass-covered dirt.
    Grass,
    /// Sand.
    Sand,
    /// Crafted wooden planks.
    Planks,
    /// A tree trunk segment.
    Log(TreeVariety),
    /// Tree foliage.
    Leaves(TreeVariety),
    /// A planted sapling.
    Sapling(TreeVariety),
    /// Decorative tall grass.
    TallGrass,
    /// Water.
    Water,
    /// Lava.
    Lava,
    /// A wooden fence post.
    Fence,
    /// A cobblestone wall.
    Wall,
    /// A fence gate.
    FenceGate,
    /// A door.
    Door,
    /// A straight construction tape marker.
    ConstructionTape,
    /// A corner construction tape marker.
    ConstructionTapeCorner,
    /// The field hut placed at the corner of a farm field.
    FieldHut,
}

impl BlockKind {
    /// Return the material this block is made of.
    pub const fn material(self) -> Material {
        match self {
            Self::Air => Material::Air,
            Self::Stone | Self::Wall => Material::Rock,
            Self::Dirt | Self::Grass => Material::Ground,
            Self::Sand => Material::Sand,
            Self::Planks
            | Self::Log(_)
            | Self::Fence
            | Self::FenceGate
            | Self::Door
            | Self::FieldHut => Material::Wood,
            Self::Leaves(_) => Material::Leaves,
            Self::Sapling(_) | Self::TallGrass => Material::Plants,
            Self::Water => Material::Water,
            Self::Lava => Material::Lava,
            Self::ConstructionTape | Self::ConstructionTapeCorner => Material::Cloth,
        }
    }

    /// Return the tree variety if this block is a log.
    pub const fn log_variety(self) -> Option<TreeVariety> {
        match self {
            Self::Log(variety) => Some(variety),
            _ => None,
        }
    }

    /// Return the tree variety if this block is a leaf.
    pub const fn leaf_variety(self) -> Option<TreeVariety> {
        match self {
            Self::Leaves(variety) => Some(variety),
            _ => None,
        }
    }

    /// Whether the block occupies a fence-like footprint (fences, walls,
    /// field huts).
    pub const fn is_fence_like(self) -> bool {
        matches!(self, Self::Fence | Self::Wall | Self::FieldHut)
    }

    /// Whether the block is a construction tape marker of either shape.
    pub const fn is_construction_tape(self) -> bool {
        matches!(self, Self::ConstructionTape | Self::ConstructionTapeCorner)
    }

    /// The item dropped when a worker breaks this block, if any.
    pub const fn drop_item(self) -> Option<ItemKind> {
        match self {
            Self::Log(variety) => Some(ItemKind::Log(variety)),
            Self::Sapling(variety) => Some(ItemKind::Sapling(variety)),
            Self::Planks => Some(ItemKind::Planks),
            Self::Stone | Self::Wall => Some(ItemKind::Cobblestone),
            Self::Dirt | Self::Grass => Some(ItemKind::Dirt),
            Self::Sand => Some(ItemKind::Sand),
            _ => None,
        }
    }
}

/// Surface classification of the top side of a block, as seen by the
/// pathfinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    /// The entity can walk over it.
    Walkable,
    /// Should be avoided; the entity may drop onto or through it.
    Droppable,
    /// Cannot be passed.
    NotPassable,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A kind of item that can be held in an inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// A log of the given variety.
    Log(TreeVariety),
    /// A sapling of the given variety.
    Sapling(TreeVariety),
    /// Wooden planks.
    Planks,
    /// Cobblestone.
    Cobblestone,
    /// Dirt.
    Dirt,
    /// Sand.
    Sand,
    /// Wheat seeds.
    Seeds,
    /// Harvested wheat.
    Wheat,
    /// A woodcutting axe. Tools never stack.
    Axe,
}

impl ItemKind {
    /// The largest count a single slot may hold of this item.
    pub const fn max_stack_size(self) -> u32 {
        match self {
            Self::Axe => 1,
            _ => 64,
        }
    }

    /// The block placed when this item is planted or put down, if any.
    pub const fn placed_block(self) -> Option<BlockKind> {
        match self {
            Self::Sapling(variety) => Some(BlockKind::Sapling(variety)),
            Self::Log(variety) => Some(BlockKind::Log(variety)),
            Self::Planks => Some(BlockKind::Planks),
            Self::Cobblestone => Some(BlockKind::Stone),
            Self::Dirt => Some(BlockKind::Dirt),
            Self::Sand => Some(BlockKind::Sand),
            Self::Seeds | Self::Wheat | Self::Axe => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Citizens and pathing
// ---------------------------------------------------------------------------

/// What a citizen is currently doing, used for need-based interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum CitizenStatus {
    /// Nothing to do.
    #[default]
    Idle,
    /// Asleep for the night.
    Sleeping,
    /// Performing job work.
    Working,
    /// Moving items to or from the workplace.
    GettingItems,
    /// Blocked and needs the player's help.
    NeedAssistance,
    /// No path could be found to the work target.
    PathfindingError,
}

/// The status of a pathfinding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PathFindingStatus {
    /// The path is still being computed.
    InProgressComputing,
    /// The path is computed and being walked.
    InProgressFollowing,
    /// The search finished (with or without reaching the destination).
    Complete,
    /// The search was abandoned before it finished.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liquids_are_not_solid() {
        assert!(Material::Water.is_liquid());
        assert!(Material::Lava.is_liquid());
        assert!(!Material::Water.is_solid());
        assert!(!Material::Water.blocks_movement());
    }

    #[test]
    fn plants_do_not_block_movement() {
        assert!(!BlockKind::Sapling(TreeVariety::Oak).material().blocks_movement());
        assert!(!BlockKind::TallGrass.material().is_solid());
    }

    #[test]
    fn fences_and_doors_block_movement() {
        assert!(BlockKind::Fence.material().blocks_movement());
        assert!(BlockKind::Door.material().blocks_movement());
        assert!(BlockKind::FenceGate.material().blocks_movement());
    }

    #[test]
    fn log_drops_log_item_of_same_variety() {
        assert_eq!(
            BlockKind::Log(TreeVariety::Birch).drop_item(),
            Some(ItemKind::Log(TreeVariety::Birch))
        );
        assert_eq!(BlockKind::Leaves(TreeVariety::Birch).drop_item(), None);
    }

    #[test]
    fn sapling_places_sapling_block() {
        assert_eq!(
            ItemKind::Sapling(TreeVariety::Spruce).placed_block(),
            Some(BlockKind::Sapling(TreeVariety::Spruce))
        );
    }

    #[test]
    fn tools_do_not_stack() {
        assert_eq!(ItemKind::Axe.max_stack_size(), 1);
        assert_eq!(ItemKind::Log(TreeVariety::Oak).max_stack_size(), 64);
    }

    #[test]
    fn variety_accessors() {
        assert_eq!(BlockKind::Log(TreeVariety::Jungle).log_variety(), Some(TreeVariety::Jungle));
        assert_eq!(BlockKind::Log(TreeVariety::Jungle).leaf_variety(), None);
        assert_eq!(BlockKind::Leaves(TreeVariety::Oak).leaf_variety(), Some(TreeVariety::Oak));
    }
}
