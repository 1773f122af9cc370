//! Breadth-first pathfinding over standable blocks.
//!
//! A [`PathJob`] owns nothing but borrowed world access and a shared
//! [`PathingHelperChain`]. Every passability and surface question goes
//! through the chain, so the job itself has no block knowledge beyond the
//! material fallbacks used when the chain abstains.
//!
//! A block is *standable* when the entity's feet and head blocks are
//! passable and the block below has a walkable surface. From a standable
//! block the job tries, for each horizontal neighbour: walking level,
//! stepping up one block (with headroom above the current block), and
//! dropping up to `max_drop_height` blocks.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use colonies_types::{BlockPos, EntityPosition, PathFindingStatus, SurfaceType};

use crate::access::BlockAccess;
use crate::pathing::PathingHelperChain;

/// Default cap on expanded nodes per search.
pub const DEFAULT_MAX_NODES: usize = 4096;

/// Default number of blocks an entity may drop in one move.
pub const DEFAULT_MAX_DROP_HEIGHT: u32 = 3;

/// The outcome of a path search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// [`PathFindingStatus::Complete`] when the search ran out of nodes to
    /// explore or reached the destination, [`PathFindingStatus::Cancelled`]
    /// when the node budget ran out first.
    pub status: PathFindingStatus,
    /// Whether the last node of `path` is within reach of the destination.
    pub reaches_destination: bool,
    /// Nodes from the resolved start to the reached node, or to the explored
    /// node closest to the destination.
    pub path: Vec<BlockPos>,
}

impl PathResult {
    /// Number of nodes in the path, start included.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Whether the path holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// The last node of the path.
    pub fn end(&self) -> Option<BlockPos> {
        self.path.last().copied()
    }
}

/// A single path search from an entity to a destination.
pub struct PathJob<'w> {
    world: &'w dyn BlockAccess,
    helpers: Arc<PathingHelperChain>,
    entity: EntityPosition,
    destination: BlockPos,
    max_nodes: usize,
    max_drop_height: u32,
    reach_sq: u64,
}

impl core::fmt::Debug for PathJob<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PathJob")
            .field("helpers", &self.helpers.names())
            .field("entity", &self.entity)
            .field("destination", &self.destination)
            .field("max_nodes", &self.max_nodes)
            .field("max_drop_height", &self.max_drop_height)
            .field("reach_sq", &self.reach_sq)
            .finish_non_exhaustive()
    }
}

impl<'w> PathJob<'w> {
    /// A search from `entity`'s block to exactly `destination`.
    pub const fn new(
        world: &'w dyn BlockAccess,
        helpers: Arc<PathingHelperChain>,
        entity: EntityPosition,
        destination: BlockPos,
    ) -> Self {
        Self {
            world,
            helpers,
            entity,
            destination,
            max_nodes: DEFAULT_MAX_NODES,
            max_drop_height: DEFAULT_MAX_DROP_HEIGHT,
            reach_sq: 0,
        }
    }

    /// Cap the number of nodes expanded before the search is cancelled.
    #[must_use]
    pub const fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Cap the height of a single drop.
    #[must_use]
    pub const fn with_max_drop_height(mut self, height: u32) -> Self {
        self.max_drop_height = height;
        self
    }

    /// Accept any node within this squared distance of the destination.
    #[must_use]
    pub const fn with_reach_sq(mut self, reach_sq: u64) -> Self {
        self.reach_sq = reach_sq;
        self
    }

    /// The start after the helper chain adjusted the entity's block.
    pub fn start(&self) -> BlockPos {
        self.helpers
            .start_position(self.world, self.entity.block_pos(), self.entity)
    }

    /// Run the search.
    pub fn compute(&self) -> PathResult {
        let start = self.start();

        let mut prev: BTreeMap<BlockPos, BlockPos> = BTreeMap::new();
        let mut visited: BTreeSet<BlockPos> = BTreeSet::new();
        let mut queue: VecDeque<BlockPos> = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        let mut closest = start;
        let mut closest_dist = start.distance_sq(self.destination);
        let mut expanded: usize = 0;

        while let Some(current) = queue.pop_front() {
            if current.distance_sq(self.destination) <= self.reach_sq {
                return self.finish(PathFindingStatus::Complete, true, &prev, start, current);
            }
            if expanded >= self.max_nodes {
                debug!(
                    start = %start,
                    destination = %self.destination,
                    max_nodes = self.max_nodes,
                    "path search cancelled"
                );
                return self.finish(PathFindingStatus::Cancelled, false, &prev, start, closest);
            }
            expanded = expanded.saturating_add(1);

            for next in self.successors(current) {
                if !visited.insert(next) {
                    continue;
                }
                prev.insert(next, current);
                let dist = next.distance_sq(self.destination);
                if dist < closest_dist {
                    closest = next;
                    closest_dist = dist;
                }
                queue.push_back(next);
            }
        }

        self.finish(PathFindingStatus::Complete, false, &prev, start, closest)
    }

    fn finish(
        &self,
        status: PathFindingStatus,
        reaches_destination: bool,
        prev: &BTreeMap<BlockPos, BlockPos>,
        start: BlockPos,
        end: BlockPos,
    ) -> PathResult {
        let mut path = VecDeque::new();
        let mut current = end;
        path.push_front(current);
        while current != start {
            let Some(&predecessor) = prev.get(&current) else {
                break;
            };
            path.push_front(predecessor);
            current = predecessor;
        }
        debug!(
            destination = %self.destination,
            ?status,
            reaches_destination,
            length = path.len(),
            "path search finished"
        );
        PathResult {
            status,
            reaches_destination,
            path: path.into(),
        }
    }

    // -------------------------------------------------------------------
    // Block classification
    // -------------------------------------------------------------------

    fn passable(&self, pos: BlockPos) -> bool {
        let state = self.world.block_state(pos);
        self.helpers
            .is_passable(state)
            .unwrap_or(!state.material().blocks_movement())
    }

    fn surface(&self, pos: BlockPos) -> SurfaceType {
        let state = self.world.block_state(pos);
        self.helpers.surface_type(state).unwrap_or(if state.material().is_solid() {
            SurfaceType::Walkable
        } else {
            SurfaceType::Droppable
        })
    }

    fn standable(&self, pos: BlockPos) -> bool {
        let (Some(head), Some(below)) = (pos.up(), pos.down()) else {
            return false;
        };
        self.passable(pos) && self.passable(head) && self.surface(below) == SurfaceType::Walkable
    }

    fn headroom(&self, pos: BlockPos) -> bool {
        pos.offset(0, 2, 0).is_some_and(|above| self.passable(above))
    }

    fn landing(&self, side: BlockPos) -> Option<BlockPos> {
        if !self.passable(side) || !self.passable(side.up()?) {
            return None;
        }
        let mut pos = side;
        for _ in 0..self.max_drop_height {
            pos = pos.down()?;
            if !self.passable(pos) {
                return None;
            }
            if self.standable(pos) {
                return Some(pos);
            }
        }
        None
    }

    fn successors(&self, pos: BlockPos) -> Vec<BlockPos> {
        let mut next = Vec::new();
        for side in pos.horizontal_neighbors() {
            if self.standable(side) {
                next.push(side);
                continue;
            }
            let step = side
                .up()
                .filter(|step| self.headroom(pos) && self.standable(*step));
            if let Some(step) = step {
                next.push(step);
                continue;
            }
            if let Some(landing) = self.landing(side) {
                next.push(landing);
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::VoxelWorld;
    use crate::pathing::{FluidPathingHelper, SolidBlockPathingHelper};
    use colonies_types::BlockKind;

    /// A grass floor at y = 63 spanning `[-r, r]` on X and Z.
    fn flat_world(r: i32) -> VoxelWorld {
        let mut world = VoxelWorld::new();
        world.fill(BlockPos::new(-r, 63, -r), BlockPos::new(r, 63, r), BlockKind::Grass);
        world
    }

    fn job(world: &VoxelWorld, from: BlockPos, to: BlockPos) -> PathJob<'_> {
        PathJob::new(
            world,
            Arc::new(PathingHelperChain::with_defaults()),
            EntityPosition::centered_on(from),
            to,
        )
    }

    #[test]
    fn straight_line_on_flat_ground() {
        let world = flat_world(8);
        let result = job(&world, BlockPos::new(0, 64, 0), BlockPos::new(5, 64, 0)).compute();
        assert_eq!(result.status, PathFindingStatus::Complete);
        assert!(result.reaches_destination);
        assert_eq!(result.len(), 6);
        assert_eq!(result.end(), Some(BlockPos::new(5, 64, 0)));
    }

    #[test]
    fn routes_around_a_fence() {
        let mut world = flat_world(8);
        world.fill(BlockPos::new(3, 64, -4), BlockPos::new(3, 64, 4), BlockKind::Fence);
        let result = job(&world, BlockPos::new(0, 64, 0), BlockPos::new(6, 64, 0)).compute();
        assert!(result.reaches_destination);
        assert!(result.path.iter().all(|pos| pos.y == 64));
        assert!(result.path.iter().any(|pos| pos.z.abs() >= 5));
        assert!(result.len() > 7);
    }

    #[test]
    fn without_fence_helper_the_fence_is_climbed() {
        let mut world = flat_world(8);
        world.fill(BlockPos::new(3, 64, -8), BlockPos::new(3, 64, 8), BlockKind::Fence);
        let chain = PathingHelperChain::new()
            .with(FluidPathingHelper)
            .with(SolidBlockPathingHelper);
        let from = BlockPos::new(0, 64, 0);
        let result = PathJob::new(
            &world,
            Arc::new(chain),
            EntityPosition::centered_on(from),
            BlockPos::new(6, 64, 0),
        )
        .compute();
        assert!(result.reaches_destination);
        assert!(result.path.contains(&BlockPos::new(3, 65, 0)));
    }

    #[test]
    fn walks_through_a_door_but_not_a_wall() {
        let mut world = flat_world(8);
        world.fill(BlockPos::new(3, 64, -8), BlockPos::new(3, 65, 8), BlockKind::Wall);
        world.set_block(BlockPos::new(3, 64, 2), BlockKind::Door);
        world.set_block(BlockPos::new(3, 65, 2), BlockKind::Air);
        let result = job(&world, BlockPos::new(0, 64, 2), BlockPos::new(6, 64, 2)).compute();
        assert!(result.reaches_destination);
        assert!(result.path.contains(&BlockPos::new(3, 64, 2)));
        assert_eq!(result.len(), 7);
    }

    #[test]
    fn steps_up_and_drops_down() {
        let mut world = flat_world(8);
        world.fill(BlockPos::new(2, 64, -8), BlockPos::new(3, 64, 8), BlockKind::Dirt);
        let result = job(&world, BlockPos::new(0, 64, 0), BlockPos::new(5, 64, 0)).compute();
        assert!(result.reaches_destination);
        assert!(result.path.contains(&BlockPos::new(2, 65, 0)));
        assert!(result.path.contains(&BlockPos::new(4, 64, 0)));
    }

    #[test]
    fn drop_beyond_limit_is_refused() {
        let mut world = flat_world(4);
        // A pillar top to stand on, five blocks above the floor.
        world.fill(BlockPos::new(0, 64, 0), BlockPos::new(0, 68, 0), BlockKind::Stone);
        let from = BlockPos::new(0, 69, 0);
        let result = job(&world, from, BlockPos::new(2, 64, 0)).compute();
        assert_eq!(result.status, PathFindingStatus::Complete);
        assert!(!result.reaches_destination);
        assert_eq!(result.path, vec![from]);

        let result = job(&world, from, BlockPos::new(2, 64, 0))
            .with_max_drop_height(5)
            .compute();
        assert!(result.reaches_destination);
    }

    #[test]
    fn budget_exhaustion_cancels() {
        let world = flat_world(16);
        let result = job(&world, BlockPos::new(0, 64, 0), BlockPos::new(15, 64, 15))
            .with_max_nodes(3)
            .compute();
        assert_eq!(result.status, PathFindingStatus::Cancelled);
        assert!(!result.reaches_destination);
        assert!(!result.is_empty());
    }

    #[test]
    fn enclosed_destination_ends_at_closest_node() {
        let mut world = flat_world(6);
        world.fill(BlockPos::new(3, 64, -1), BlockPos::new(5, 65, 1), BlockKind::Wall);
        world.fill(BlockPos::new(4, 64, 0), BlockPos::new(4, 65, 0), BlockKind::Air);
        let result = job(&world, BlockPos::new(0, 64, 0), BlockPos::new(4, 64, 0)).compute();
        assert_eq!(result.status, PathFindingStatus::Complete);
        assert!(!result.reaches_destination);
        assert_eq!(result.end(), Some(BlockPos::new(2, 64, 0)));
    }

    #[test]
    fn reach_accepts_adjacent_nodes() {
        let mut world = flat_world(6);
        world.set_block(BlockPos::new(3, 64, 0), BlockKind::Stone);
        world.set_block(BlockPos::new(3, 65, 0), BlockKind::Stone);
        let result = job(&world, BlockPos::new(0, 64, 0), BlockPos::new(3, 64, 0))
            .with_reach_sq(2)
            .compute();
        assert!(result.reaches_destination);
        assert_eq!(result.end(), Some(BlockPos::new(2, 64, 0)));
    }

    #[test]
    fn start_in_water_is_lifted() {
        let mut world = flat_world(4);
        world.fill(BlockPos::new(-1, 62, -1), BlockPos::new(-1, 63, -1), BlockKind::Water);
        world.set_block(BlockPos::new(-1, 61, -1), BlockKind::Stone);
        let start = job(&world, BlockPos::new(-1, 62, -1), BlockPos::new(2, 64, 2)).start();
        assert_eq!(start, BlockPos::new(-1, 64, -1));
    }

    #[test]
    fn path_result_serializes() {
        let world = flat_world(2);
        let result = job(&world, BlockPos::new(0, 64, 0), BlockPos::new(1, 64, 0)).compute();
        let json = serde_json::to_string(&result).unwrap_or_default();
        let back: Option<PathResult> = serde_json::from_str(&json).ok();
        assert_eq!(back, Some(result));
    }
}
