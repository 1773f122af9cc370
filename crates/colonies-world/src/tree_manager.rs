//! Tree detection: recognising a tree, collecting its blocks, and marking
//! its stumps.
//!
//! A block counts as a tree when it is a log whose trunk rests on soil and
//! carries leaves of the same variety at its top. Detection then
//! flood-fills the connected logs of that variety (26-neighbour) and the
//! leaves touching them.

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use colonies_types::{BlockKind, BlockPos, TreeVariety};

use crate::access::BlockAccess;
use crate::error::WorldError;
use crate::tree::Tree;

/// Default cap on the logs of one tree.
pub const DEFAULT_MAX_LOGS: usize = 128;

/// Default cap on the leaves collected for one tree.
pub const DEFAULT_MAX_LEAVES: usize = 512;

/// Detects trees and fills [`Tree`] records from the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeManager {
    max_logs: usize,
    max_leaves: usize,
}

impl Default for TreeManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOGS, DEFAULT_MAX_LEAVES)
    }
}

/// The 26 positions surrounding `pos`. Neighbours that would overflow are
/// omitted.
fn around(pos: BlockPos) -> impl Iterator<Item = BlockPos> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dz| {
                if dx == 0 && dy == 0 && dz == 0 {
                    None
                } else {
                    pos.offset(dx, dy, dz)
                }
            })
        })
    })
}

/// Bottom-up order: by height, then position.
fn bottom_up(positions: &mut [BlockPos]) {
    positions.sort_by_key(|pos| (pos.y, pos.x, pos.z));
}

impl TreeManager {
    /// A manager with explicit limits.
    pub const fn new(max_logs: usize, max_leaves: usize) -> Self {
        Self {
            max_logs,
            max_leaves,
        }
    }

    /// Log limit per tree.
    pub const fn max_logs(&self) -> usize {
        self.max_logs
    }

    /// Leaf limit per tree.
    pub const fn max_leaves(&self) -> usize {
        self.max_leaves
    }

    fn log_variety(world: &dyn BlockAccess, pos: BlockPos) -> Option<TreeVariety> {
        world.block_state(pos).kind.log_variety()
    }

    /// Follow the trunk down from `pos` to its lowest log.
    fn trunk_base(
        &self,
        world: &dyn BlockAccess,
        pos: BlockPos,
        variety: TreeVariety,
    ) -> Result<BlockPos, WorldError> {
        let mut base = pos;
        for _ in 0..self.max_logs {
            let below = base.down().ok_or(WorldError::PositionOverflow(base))?;
            if Self::log_variety(world, below) != Some(variety) {
                return Ok(base);
            }
            base = below;
        }
        Err(WorldError::TreeTooLarge {
            location: base,
            limit: self.max_logs,
        })
    }

    /// Follow the trunk up from `pos` to its highest log.
    fn trunk_top(&self, world: &dyn BlockAccess, pos: BlockPos, variety: TreeVariety) -> BlockPos {
        let mut top = pos;
        for _ in 0..self.max_logs {
            let Some(above) = top.up() else {
                break;
            };
            if Self::log_variety(world, above) != Some(variety) {
                break;
            }
            top = above;
        }
        top
    }

    /// Whether `pos` is part of a tree: a log on a soil-rooted trunk with
    /// same-variety leaves at its top.
    pub fn is_tree(&self, world: &dyn BlockAccess, pos: BlockPos) -> bool {
        let Some(variety) = Self::log_variety(world, pos) else {
            return false;
        };
        let Ok(base) = self.trunk_base(world, pos, variety) else {
            return false;
        };
        let rooted = base.down().is_some_and(|below| {
            matches!(world.block_state(below).kind, BlockKind::Dirt | BlockKind::Grass)
        });
        if !rooted {
            return false;
        }
        let top = self.trunk_top(world, pos, variety);
        top.up()
            .into_iter()
            .flat_map(|crown| core::iter::once(crown).chain(crown.horizontal_neighbors()))
            .chain(top.horizontal_neighbors())
            .any(|leaf| world.block_state(leaf).kind.leaf_variety() == Some(variety))
    }

    /// Collect every connected log of the tree's variety, starting at its
    /// location, and the leaves touching them.
    ///
    /// Logs and leaves are pushed bottom-up, replacing whatever the tree
    /// held. Leaves beyond the leaf limit are left out.
    ///
    /// # Errors
    ///
    /// [`WorldError::TreeNotFound`] if the location holds no log of the
    /// tree's variety, [`WorldError::TreeTooLarge`] if the trunk exceeds
    /// the log limit.
    pub fn find_logs(&self, world: &dyn BlockAccess, tree: &mut Tree) -> Result<(), WorldError> {
        let variety = tree.variety();
        let start = tree.location();
        if Self::log_variety(world, start) != Some(variety) {
            return Err(WorldError::TreeNotFound(start));
        }

        let mut logs: BTreeSet<BlockPos> = BTreeSet::new();
        let mut queue: VecDeque<BlockPos> = VecDeque::new();
        logs.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for next in around(current) {
                if Self::log_variety(world, next) != Some(variety) || !logs.insert(next) {
                    continue;
                }
                if logs.len() > self.max_logs {
                    return Err(WorldError::TreeTooLarge {
                        location: start,
                        limit: self.max_logs,
                    });
                }
                queue.push_back(next);
            }
        }

        let mut leaves: BTreeSet<BlockPos> = BTreeSet::new();
        'logs: for log in &logs {
            for next in around(*log) {
                if leaves.len() >= self.max_leaves {
                    break 'logs;
                }
                if world.block_state(next).kind.leaf_variety() == Some(variety) {
                    leaves.insert(next);
                }
            }
        }

        let mut logs: Vec<BlockPos> = logs.into_iter().collect();
        let mut leaves: Vec<BlockPos> = leaves.into_iter().collect();
        bottom_up(&mut logs);
        bottom_up(&mut leaves);

        while tree.poll_next_log().is_some() {}
        while tree.poll_next_leaf().is_some() {}
        for log in logs {
            tree.push_log(log);
        }
        for leaf in leaves {
            tree.push_leaf(leaf);
        }
        Ok(())
    }

    /// Record every log at `y_level` as a stump.
    pub fn fill_tree_stumps(tree: &mut Tree, y_level: i32) {
        let stumps: Vec<BlockPos> = tree
            .logs()
            .iter()
            .copied()
            .filter(|log| log.y == y_level)
            .collect();
        for stump in stumps {
            tree.add_stump(stump);
        }
    }

    /// Build a complete [`Tree`] from any of its logs.
    ///
    /// # Errors
    ///
    /// [`WorldError::TreeNotFound`] if `pos` is not part of a tree, or any
    /// error from [`Self::find_logs`].
    pub fn detect(&self, world: &dyn BlockAccess, pos: BlockPos) -> Result<Tree, WorldError> {
        if !self.is_tree(world, pos) {
            return Err(WorldError::TreeNotFound(pos));
        }
        let variety = Self::log_variety(world, pos).ok_or(WorldError::TreeNotFound(pos))?;
        let base = self.trunk_base(world, pos, variety)?;

        let mut tree = Tree::new(base, variety);
        self.find_logs(world, &mut tree)?;
        Self::fill_tree_stumps(&mut tree, base.y);
        debug!(
            location = %base,
            ?variety,
            logs = tree.logs().len(),
            leaves = tree.leaves().len(),
            "tree detected"
        );
        Ok(tree)
    }

    /// Detect every tree whose base lies within `radius` blocks of `center`
    /// horizontally and `depth` blocks vertically, nearest first.
    pub fn find_trees_near(
        &self,
        world: &dyn BlockAccess,
        center: BlockPos,
        radius: i32,
        depth: i32,
    ) -> Vec<Tree> {
        let mut seen: BTreeSet<BlockPos> = BTreeSet::new();
        let mut trees = Vec::new();
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                for dy in -depth..=depth {
                    let Some(pos) = center.offset(dx, dy, dz) else {
                        continue;
                    };
                    let Some(variety) = Self::log_variety(world, pos) else {
                        continue;
                    };
                    let is_base = pos
                        .down()
                        .is_some_and(|below| Self::log_variety(world, below) != Some(variety));
                    if !is_base || !seen.insert(pos) {
                        continue;
                    }
                    match self.detect(world, pos) {
                        Ok(tree) => trees.push(tree),
                        Err(err) => debug!(position = %pos, %err, "skipping log"),
                    }
                }
            }
        }
        trees.sort_by_key(|tree| tree.location().distance_sq(center));
        trees
    }
}
