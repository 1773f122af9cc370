//! A tree as the lumberjack sees it: a base location and the blocks left
//! to clear.
//!
//! Logs and leaves are stacks. Detection pushes them bottom-up, so polling
//! hands out the topmost remaining block first. Stumps are the base-level
//! log positions where a sapling is replanted once the tree is gone.

use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use colonies_types::{BlockPos, ItemKind, ItemStack, TreeVariety};

/// A detected tree.
///
/// Two trees are equal when they stand at the same location, whatever is
/// left of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    location: BlockPos,
    variety: TreeVariety,
    logs: Vec<BlockPos>,
    leaves: Vec<BlockPos>,
    stumps: Vec<BlockPos>,
}

impl Tree {
    /// An empty tree rooted at `location`.
    pub const fn new(location: BlockPos, variety: TreeVariety) -> Self {
        Self {
            location,
            variety,
            logs: Vec::new(),
            leaves: Vec::new(),
            stumps: Vec::new(),
        }
    }

    /// The base log position.
    pub const fn location(&self) -> BlockPos {
        self.location
    }

    /// The wood variety.
    pub const fn variety(&self) -> TreeVariety {
        self.variety
    }

    // -------------------------------------------------------------------
    // Logs and leaves
    // -------------------------------------------------------------------

    /// Push a log; it is polled before every log pushed earlier.
    pub fn push_log(&mut self, pos: BlockPos) {
        self.logs.push(pos);
    }

    /// Push a leaf; it is polled before every leaf pushed earlier.
    pub fn push_leaf(&mut self, pos: BlockPos) {
        self.leaves.push(pos);
    }

    /// Remove and return the next log to cut.
    pub fn poll_next_log(&mut self) -> Option<BlockPos> {
        self.logs.pop()
    }

    /// Remove and return the next leaf to clear.
    pub fn poll_next_leaf(&mut self) -> Option<BlockPos> {
        self.leaves.pop()
    }

    /// The next log to cut, without removing it.
    pub fn peek_next_log(&self) -> Option<BlockPos> {
        self.logs.last().copied()
    }

    /// The next leaf to clear, without removing it.
    pub fn peek_next_leaf(&self) -> Option<BlockPos> {
        self.leaves.last().copied()
    }

    /// Whether logs remain.
    pub fn has_logs(&self) -> bool {
        !self.logs.is_empty()
    }

    /// Whether leaves remain.
    pub fn has_leaves(&self) -> bool {
        !self.leaves.is_empty()
    }

    /// Remaining logs, last polled first.
    pub fn logs(&self) -> &[BlockPos] {
        &self.logs
    }

    /// Remaining leaves, last polled first.
    pub fn leaves(&self) -> &[BlockPos] {
        &self.leaves
    }

    // -------------------------------------------------------------------
    // Stumps
    // -------------------------------------------------------------------

    /// Record a stump position. Duplicates are ignored.
    pub fn add_stump(&mut self, pos: BlockPos) {
        if !self.stumps.contains(&pos) {
            self.stumps.push(pos);
        }
    }

    /// Positions still waiting for a sapling.
    pub fn stump_locations(&self) -> &[BlockPos] {
        &self.stumps
    }

    /// Forget a stump once it has been replanted. Returns whether it was
    /// recorded.
    pub fn remove_stump(&mut self, pos: BlockPos) -> bool {
        let before = self.stumps.len();
        self.stumps.retain(|stump| *stump != pos);
        self.stumps.len() != before
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Whether `stack` holds saplings that grow into this tree.
    pub fn is_item_stack_matching(&self, stack: ItemStack) -> bool {
        !stack.is_empty() && stack.item == ItemKind::Sapling(self.variety)
    }

    /// Squared distance between the two trees' locations.
    pub fn square_distance(&self, other: &Self) -> u64 {
        self.location.distance_sq(other.location)
    }

    /// Whether nothing is left to cut, clear, or replant.
    pub fn is_exhausted(&self) -> bool {
        self.logs.is_empty() && self.leaves.is_empty() && self.stumps.is_empty()
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Tree {}

impl Hash for Tree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn oak_at(x: i32) -> Tree {
        Tree::new(BlockPos::new(x, 64, 0), TreeVariety::Oak)
    }

    #[test]
    fn polling_is_lifo_and_empties_the_stacks() {
        let mut tree = oak_at(0);
        for y in 64..68 {
            tree.push_log(BlockPos::new(0, y, 0));
        }
        tree.push_leaf(BlockPos::new(1, 67, 0));
        tree.push_leaf(BlockPos::new(0, 68, 0));

        assert_eq!(tree.peek_next_log(), Some(BlockPos::new(0, 67, 0)));
        assert_eq!(tree.poll_next_log(), Some(BlockPos::new(0, 67, 0)));
        assert_eq!(tree.poll_next_leaf(), Some(BlockPos::new(0, 68, 0)));

        while tree.poll_next_log().is_some() {}
        while tree.poll_next_leaf().is_some() {}
        assert!(!tree.has_logs());
        assert!(!tree.has_leaves());
        assert_eq!(tree.poll_next_log(), None);
        assert_eq!(tree.peek_next_leaf(), None);
    }

    #[test]
    fn equality_and_hash_follow_location_only() {
        let mut a = oak_at(3);
        a.push_log(BlockPos::new(3, 64, 0));
        let b = Tree::new(BlockPos::new(3, 64, 0), TreeVariety::Birch);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
        assert!(set.insert(oak_at(4)));
    }

    #[test]
    fn stumps_are_removed_once() {
        let mut tree = oak_at(0);
        tree.add_stump(BlockPos::new(0, 64, 0));
        tree.add_stump(BlockPos::new(0, 64, 0));
        assert_eq!(tree.stump_locations().len(), 1);
        assert!(tree.remove_stump(BlockPos::new(0, 64, 0)));
        assert!(!tree.remove_stump(BlockPos::new(0, 64, 0)));
        assert!(tree.is_exhausted());
    }

    #[test]
    fn saplings_match_by_variety() {
        let tree = Tree::new(BlockPos::default(), TreeVariety::Spruce);
        assert!(tree.is_item_stack_matching(ItemStack::new(
            ItemKind::Sapling(TreeVariety::Spruce),
            2
        )));
        assert!(!tree.is_item_stack_matching(ItemStack::new(
            ItemKind::Sapling(TreeVariety::Oak),
            2
        )));
        assert!(!tree.is_item_stack_matching(ItemStack::new(
            ItemKind::Sapling(TreeVariety::Spruce),
            0
        )));
        assert!(!tree.is_item_stack_matching(ItemStack::new(
            ItemKind::Log(TreeVariety::Spruce),
            2
        )));
    }

    #[test]
    fn square_distance_between_locations() {
        assert_eq!(oak_at(0).square_distance(&oak_at(3)), 9);
    }

    #[test]
    fn serde_keeps_stack_order() {
        let mut tree = oak_at(0);
        tree.push_log(BlockPos::new(0, 64, 0));
        tree.push_log(BlockPos::new(0, 65, 0));
        tree.push_leaf(BlockPos::new(0, 66, 0));
        tree.add_stump(BlockPos::new(0, 64, 0));

        let json = serde_json::to_string(&tree).unwrap_or_default();
        let back: Option<Tree> = serde_json::from_str(&json).ok();
        assert!(back.is_some());
        if let Some(mut back) = back {
            assert_eq!(back.logs(), tree.logs());
            assert_eq!(back.leaves(), tree.leaves());
            assert_eq!(back.stump_locations(), tree.stump_locations());
            assert_eq!(back.variety(), TreeVariety::Oak);
            assert_eq!(back.poll_next_log(), Some(BlockPos::new(0, 65, 0)));
        }
    }
}
