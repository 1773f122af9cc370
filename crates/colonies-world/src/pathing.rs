//! Pathing helpers: small, ordered block-classification overrides.
//!
//! Each [`PathingHelper`] answers three questions about a block, or
//! abstains with the neutral answer. A [`PathingHelperChain`] asks its
//! helpers in registration order and keeps the first definitive answer, so
//! a specific helper (fences) must be registered before a generic one
//! (solid blocks) for its answer to win.

use core::fmt;

use tracing::debug;

use colonies_types::{BlockKind, BlockPos, BlockState, EntityPosition, SurfaceType};

use crate::access::BlockAccess;

/// Sub-block offset below which an entity counts as hugging the lower edge.
pub const TOO_CLOSE: f64 = 0.1;

/// Sub-block offset above which an entity counts as hugging the upper edge.
pub const TOO_FAR: f64 = 0.9;

/// A block-classification override consulted by the pathfinder.
///
/// Every method has a neutral default, so a helper only implements the
/// questions it has an opinion on.
pub trait PathingHelper: Send + Sync + fmt::Debug {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Adjust the start position of a path search. `state` is the block at
    /// `current`.
    fn start_position(
        &self,
        _world: &dyn BlockAccess,
        current: BlockPos,
        _state: BlockState,
        _entity: EntityPosition,
    ) -> BlockPos {
        current
    }

    /// Classify the top surface of a block, or abstain.
    fn surface_type(&self, _state: BlockState) -> Option<SurfaceType> {
        None
    }

    /// Whether an entity can occupy the block, or abstain.
    fn is_passable(&self, _state: BlockState) -> Option<bool> {
        None
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lifts starts out of liquid columns. Liquids are never passable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FluidPathingHelper;

impl PathingHelper for FluidPathingHelper {
    fn name(&self) -> &'static str {
        "fluid"
    }

    fn start_position(
        &self,
        world: &dyn BlockAccess,
        current: BlockPos,
        state: BlockState,
        _entity: EntityPosition,
    ) -> BlockPos {
        if !state.material().is_liquid() {
            return current;
        }
        let mut pos = current;
        while world.block_state(pos).material().is_liquid() {
            let Some(up) = pos.up() else {
                break;
            };
            pos = up;
        }
        pos
    }

    fn is_passable(&self, state: BlockState) -> Option<bool> {
        state.material().is_liquid().then_some(false)
    }
}

/// Fences, walls, gates, and field huts.
///
/// An entity standing against one of these is really in the neighbouring
/// block, so the start is nudged away along X and Z independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct FenceLikePathingHelper;

const fn nudge(offset: f64) -> i32 {
    if offset < TOO_CLOSE {
        -1
    } else if offset > TOO_FAR {
        1
    } else {
        0
    }
}

impl PathingHelper for FenceLikePathingHelper {
    fn name(&self) -> &'static str {
        "fence"
    }

    fn start_position(
        &self,
        _world: &dyn BlockAccess,
        current: BlockPos,
        state: BlockState,
        entity: EntityPosition,
    ) -> BlockPos {
        if !state.kind.is_fence_like() {
            return current;
        }
        let dx = nudge(entity.block_offset_x());
        let dz = nudge(entity.block_offset_z());
        current.offset(dx, 0, dz).unwrap_or(current)
    }

    fn surface_type(&self, state: BlockState) -> Option<SurfaceType> {
        matches!(
            state.kind,
            BlockKind::Fence | BlockKind::FenceGate | BlockKind::Wall | BlockKind::FieldHut
        )
        .then_some(SurfaceType::NotPassable)
    }

    fn is_passable(&self, state: BlockState) -> Option<bool> {
        let opens = matches!(
            state.kind,
            BlockKind::Door
                | BlockKind::FenceGate
                | BlockKind::ConstructionTape
                | BlockKind::ConstructionTapeCorner
        );
        (opens && state.material().blocks_movement()).then_some(true)
    }
}

/// Construction tape can be walked through but not stood on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructionTapePathingHelper;

impl PathingHelper for ConstructionTapePathingHelper {
    fn name(&self) -> &'static str {
        "tape"
    }

    fn surface_type(&self, state: BlockState) -> Option<SurfaceType> {
        state
            .kind
            .is_construction_tape()
            .then_some(SurfaceType::Droppable)
    }
}

/// The generic fallback: solid tops are walkable, movement-blocking
/// materials are impassable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidBlockPathingHelper;

impl PathingHelper for SolidBlockPathingHelper {
    fn name(&self) -> &'static str {
        "solid"
    }

    fn surface_type(&self, state: BlockState) -> Option<SurfaceType> {
        state.material().is_solid().then_some(SurfaceType::Walkable)
    }

    fn is_passable(&self, state: BlockState) -> Option<bool> {
        Some(!state.material().blocks_movement())
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// An ordered list of helpers. Built once, then shared read-only.
#[derive(Debug, Default)]
pub struct PathingHelperChain {
    helpers: Vec<Box<dyn PathingHelper>>,
}

impl PathingHelperChain {
    /// An empty chain. Every query abstains.
    pub const fn new() -> Self {
        Self {
            helpers: Vec::new(),
        }
    }

    /// The standard chain: fluid, fence-like, tape, solid.
    pub fn with_defaults() -> Self {
        Self::new()
            .with(FluidPathingHelper)
            .with(FenceLikePathingHelper)
            .with(ConstructionTapePathingHelper)
            .with(SolidBlockPathingHelper)
    }

    /// Append a helper after every helper already registered.
    #[must_use]
    pub fn with(mut self, helper: impl PathingHelper + 'static) -> Self {
        self.helpers.push(Box::new(helper));
        self
    }

    /// Number of registered helpers.
    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    /// Whether no helper is registered.
    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    /// Helper names in consultation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.helpers.iter().map(|helper| helper.name()).collect()
    }

    /// Thread `start` through every helper in order. Each helper sees the
    /// block state at the position the previous one returned.
    pub fn start_position(
        &self,
        world: &dyn BlockAccess,
        start: BlockPos,
        entity: EntityPosition,
    ) -> BlockPos {
        self.helpers.iter().fold(start, |pos, helper| {
            let next = helper.start_position(world, pos, world.block_state(pos), entity);
            if next != pos {
                debug!(helper = helper.name(), from = %pos, to = %next, "path start adjusted");
            }
            next
        })
    }

    /// The first definitive surface classification.
    pub fn surface_type(&self, state: BlockState) -> Option<SurfaceType> {
        self.helpers
            .iter()
            .find_map(|helper| helper.surface_type(state))
    }

    /// The first definitive passability answer.
    pub fn is_passable(&self, state: BlockState) -> Option<bool> {
        self.helpers
            .iter()
            .find_map(|helper| helper.is_passable(state))
    }
}
