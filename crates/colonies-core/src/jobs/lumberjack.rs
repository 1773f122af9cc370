//! The lumberjack: fells the trees around its hut, clears their leaves,
//! replants the stumps, and carries the logs home.
//!
//! Each tick does one step: move one block along the current route, cut
//! one log, clear one leaf, plant one sapling, or unload at the hut.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use colonies_types::{BlockKind, BlockPos, CitizenStatus, EntityPosition, ItemKind, ItemStack};
use colonies_world::{PathJob, Tree, TreeManager};

use crate::error::CoreError;
use crate::job::{Job, JobCommon, JobContext, LUMBERJACK};
use crate::storage;

/// Vertical half-range of the tree search around the hut.
pub const SEARCH_DEPTH: i32 = 8;

/// Squared distance at which a block counts as within reach.
pub const REACH_SQ: u64 = 2;

/// One sapling drops for every this many leaves cleared.
pub const LEAVES_PER_SAPLING: u32 = 4;

/// What the lumberjack is busy with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LumberjackState {
    /// Looking for the next tree.
    #[default]
    Idle,
    /// Walking to the chosen tree.
    WalkingToTree,
    /// Cutting logs.
    Chopping,
    /// Clearing leaves.
    ClearingLeaves,
    /// Planting saplings on the stumps.
    Replanting,
    /// Carrying logs to the hut.
    Depositing,
}

enum Walk {
    Moving,
    Arrived,
    Unreachable,
}

/// The lumberjack job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LumberjackJob {
    #[serde(default)]
    common: JobCommon,
    #[serde(default)]
    state: LumberjackState,
    #[serde(default)]
    tree: Option<Tree>,
    #[serde(default)]
    route: VecDeque<BlockPos>,
    #[serde(default)]
    route_target: Option<BlockPos>,
    #[serde(default)]
    skipped: BTreeSet<BlockPos>,
    #[serde(default)]
    leaves_cleared: u32,
    #[serde(default)]
    logs_cut: u64,
    #[serde(default)]
    trees_felled: u64,
}

fn carried_logs(ctx: &JobContext<'_>) -> u32 {
    ctx.inventory
        .occupied()
        .filter(|(_, stack)| matches!(stack.item, ItemKind::Log(_)))
        .fold(0_u32, |acc, (_, stack)| acc.saturating_add(stack.count))
}

impl LumberjackJob {
    /// The current state.
    pub const fn state(&self) -> LumberjackState {
        self.state
    }

    /// The tree being worked on.
    pub const fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Logs cut since the job started.
    pub const fn logs_cut(&self) -> u64 {
        self.logs_cut
    }

    /// Trees fully cleared since the job started.
    pub const fn trees_felled(&self) -> u64 {
        self.trees_felled
    }

    // -------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------

    fn walk(&mut self, ctx: &mut JobContext<'_>, target: BlockPos) -> Walk {
        if self.route_target != Some(target) {
            let pathing = &ctx.config.pathing;
            let result = PathJob::new(
                &*ctx.world,
                Arc::clone(ctx.helpers),
                EntityPosition::centered_on(*ctx.position),
                target,
            )
            .with_max_nodes(pathing.max_nodes)
            .with_max_drop_height(pathing.max_drop_height)
            .with_reach_sq(REACH_SQ)
            .compute();
            if !result.reaches_destination {
                self.route.clear();
                self.route_target = None;
                return Walk::Unreachable;
            }
            self.route = result.path.into_iter().skip(1).collect();
            self.route_target = Some(target);
        }

        let Some(next) = self.route.pop_front() else {
            self.route_target = None;
            return Walk::Arrived;
        };
        *ctx.position = next;
        if self.route.is_empty() {
            self.route_target = None;
            Walk::Arrived
        } else {
            Walk::Moving
        }
    }

    // -------------------------------------------------------------------
    // States
    // -------------------------------------------------------------------

    fn choose_tree(&mut self, ctx: &JobContext<'_>) -> CitizenStatus {
        let center = ctx
            .workplace
            .as_ref()
            .map_or(*ctx.position, |hut| hut.location());
        let settings = &ctx.config.lumberjack;
        let manager = TreeManager::new(settings.max_logs, settings.max_leaves);
        let here = *ctx.position;
        let nearest = manager
            .find_trees_near(&*ctx.world, center, settings.search_radius, SEARCH_DEPTH)
            .into_iter()
            .filter(|tree| !self.skipped.contains(&tree.location()))
            .min_by_key(|tree| tree.location().distance_sq(here));

        match nearest {
            Some(tree) => {
                debug!(citizen = %ctx.citizen, location = %tree.location(), logs = tree.logs().len(), "tree chosen");
                self.tree = Some(tree);
                self.state = LumberjackState::WalkingToTree;
                CitizenStatus::Working
            }
            None if carried_logs(ctx) > 0 => {
                self.state = LumberjackState::Depositing;
                CitizenStatus::GettingItems
            }
            None => {
                self.skipped.clear();
                CitizenStatus::Idle
            }
        }
    }

    fn walk_to_tree(&mut self, ctx: &mut JobContext<'_>) -> CitizenStatus {
        let Some(location) = self.tree.as_ref().map(Tree::location) else {
            self.state = LumberjackState::Idle;
            return CitizenStatus::Idle;
        };
        match self.walk(ctx, location) {
            Walk::Moving => CitizenStatus::Working,
            Walk::Arrived => {
                self.state = if self.tree.as_ref().is_some_and(Tree::has_logs) {
                    LumberjackState::Chopping
                } else {
                    LumberjackState::ClearingLeaves
                };
                CitizenStatus::Working
            }
            Walk::Unreachable => {
                warn!(citizen = %ctx.citizen, location = %location, "tree is unreachable");
                self.skipped.insert(location);
                self.tree = None;
                self.state = LumberjackState::Idle;
                CitizenStatus::PathfindingError
            }
        }
    }

    fn chop(&mut self, ctx: &mut JobContext<'_>) -> CitizenStatus {
        let Some(tree) = self.tree.as_mut() else {
            self.state = LumberjackState::Idle;
            return CitizenStatus::Idle;
        };
        let Some(log) = tree.poll_next_log() else {
            self.state = LumberjackState::ClearingLeaves;
            return CitizenStatus::Working;
        };

        let kind = ctx.world.block(log);
        if kind.log_variety() != Some(tree.variety()) {
            debug!(position = %log, "log already gone");
            return CitizenStatus::Working;
        }
        ctx.world.break_block(log);
        self.logs_cut = self.logs_cut.saturating_add(1);
        if let Some(item) = kind.drop_item() {
            if let Some(lost) = ctx.inventory.add_stack(ItemStack::new(item, 1)) {
                warn!(citizen = %ctx.citizen, ?lost, "inventory full, dropping log");
            }
        }

        if carried_logs(ctx) >= ctx.config.lumberjack.deposit_threshold {
            self.state = LumberjackState::Depositing;
        }
        CitizenStatus::Working
    }

    fn clear_leaf(&mut self, ctx: &mut JobContext<'_>) -> CitizenStatus {
        let Some(tree) = self.tree.as_mut() else {
            self.state = LumberjackState::Idle;
            return CitizenStatus::Idle;
        };
        let Some(leaf) = tree.poll_next_leaf() else {
            self.state = LumberjackState::Replanting;
            return CitizenStatus::Working;
        };

        if ctx.world.block(leaf).leaf_variety() != Some(tree.variety()) {
            return CitizenStatus::Working;
        }
        ctx.world.break_block(leaf);
        self.leaves_cleared = self.leaves_cleared.saturating_add(1);
        if self.leaves_cleared.checked_rem(LEAVES_PER_SAPLING) == Some(0) {
            let sapling = ItemStack::new(ItemKind::Sapling(tree.variety()), 1);
            if ctx.inventory.add_stack(sapling).is_some() {
                debug!(citizen = %ctx.citizen, "no room for sapling");
            }
        }
        CitizenStatus::Working
    }

    fn replant(&mut self, ctx: &mut JobContext<'_>) -> CitizenStatus {
        let Some(tree) = self.tree.as_mut() else {
            self.state = LumberjackState::Idle;
            return CitizenStatus::Idle;
        };
        let Some(stump) = tree.stump_locations().first().copied() else {
            self.finish_tree(ctx);
            return CitizenStatus::Working;
        };
        tree.remove_stump(stump);
        if !ctx.config.lumberjack.replant || ctx.world.block(stump) != BlockKind::Air {
            return CitizenStatus::Working;
        }

        let sapling = ctx
            .inventory
            .occupied()
            .map(|(_, stack)| *stack)
            .find(|stack| tree.is_item_stack_matching(*stack));
        if sapling.and_then(|stack| ctx.inventory.take_item(stack.item, 1)).is_some() {
            ctx.world.set_block(stump, BlockKind::Sapling(tree.variety()));
            debug!(citizen = %ctx.citizen, position = %stump, "sapling planted");
        } else {
            debug!(citizen = %ctx.citizen, position = %stump, "no sapling to plant");
        }
        CitizenStatus::Working
    }

    fn finish_tree(&mut self, ctx: &JobContext<'_>) {
        if let Some(tree) = self.tree.take() {
            debug!(citizen = %ctx.citizen, location = %tree.location(), "tree cleared");
            self.trees_felled = self.trees_felled.saturating_add(1);
        }
        self.leaves_cleared = 0;
        self.state = if carried_logs(ctx) > 0 {
            LumberjackState::Depositing
        } else {
            LumberjackState::Idle
        };
    }

    fn deposit(&mut self, ctx: &mut JobContext<'_>) -> Result<CitizenStatus, CoreError> {
        let Some(hut) = ctx.workplace.as_ref().map(|hut| hut.location()) else {
            warn!(citizen = %ctx.citizen, "lumberjack has no hut to unload at");
            return Ok(CitizenStatus::NeedAssistance);
        };
        match self.walk(ctx, hut) {
            Walk::Moving => return Ok(CitizenStatus::GettingItems),
            Walk::Unreachable => {
                warn!(citizen = %ctx.citizen, hut = %hut, "hut is unreachable");
                return Ok(CitizenStatus::PathfindingError);
            }
            Walk::Arrived => {}
        }

        let kinds: BTreeSet<ItemKind> = ctx
            .inventory
            .occupied()
            .map(|(_, stack)| stack.item)
            .filter(|item| matches!(item, ItemKind::Log(_)))
            .collect();
        let Some(building) = ctx.workplace.as_deref_mut() else {
            return Ok(CitizenStatus::NeedAssistance);
        };
        for item in kinds {
            let moved = storage::transfer(building.inventory_mut(), ctx.inventory, item, u32::MAX)?;
            debug!(citizen = %ctx.citizen, ?item, moved, "logs stored");
        }

        if carried_logs(ctx) > 0 {
            warn!(citizen = %ctx.citizen, hut = %hut, "hut storage is full");
            return Ok(CitizenStatus::NeedAssistance);
        }
        self.state = if self.tree.is_some() {
            LumberjackState::WalkingToTree
        } else {
            LumberjackState::Idle
        };
        Ok(CitizenStatus::Working)
    }
}

impl Job for LumberjackJob {
    fn kind(&self) -> &'static str {
        LUMBERJACK
    }

    fn common(&self) -> &JobCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut JobCommon {
        &mut self.common
    }

    fn save_state(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn tick(&mut self, ctx: &mut JobContext<'_>) -> Result<CitizenStatus, CoreError> {
        if ctx.inventory.count_of(ItemKind::Axe) == 0 {
            if !self.common.items_needed.iter().any(|s| s.item == ItemKind::Axe) {
                debug!(citizen = %ctx.citizen, "lumberjack needs an axe");
                self.common.add_item_needed(ItemStack::new(ItemKind::Axe, 1));
            }
            return Ok(CitizenStatus::NeedAssistance);
        }

        let status = match self.state {
            LumberjackState::Idle => self.choose_tree(ctx),
            LumberjackState::WalkingToTree => self.walk_to_tree(ctx),
            LumberjackState::Chopping => self.chop(ctx),
            LumberjackState::ClearingLeaves => self.clear_leaf(ctx),
            LumberjackState::Replanting => self.replant(ctx),
            LumberjackState::Depositing => self.deposit(ctx)?,
        };
        Ok(status)
    }
}
