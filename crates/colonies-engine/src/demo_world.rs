//! Seeded demo world for the engine.
//!
//! A flat grass plain with room for a lumberjack hut and a workshop at the
//! centre, and trees of random variety and height scattered around it.
//! The same [`WorldConfig`] always produces the same world.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use colonies_core::config::WorldConfig;
use colonies_types::{BlockKind, BlockPos, TreeVariety};
use colonies_world::VoxelWorld;

use crate::error::EngineError;

/// Height of the grass surface.
pub const GROUND_Y: i32 = 63;

/// First block above the grass.
pub const FLOOR_Y: i32 = 64;

const SOIL_Y: i32 = 62;

/// Smallest half-extent the generator accepts.
pub const MIN_SIZE: i32 = 8;

/// Trees keep this far (in blocks, per axis) from the centre.
const CENTRE_CLEARANCE: u32 = 3;

/// Trees keep this squared distance from each other.
const TREE_SPACING_SQ: u64 = 16;

/// Varieties the generator plants.
pub const VARIETIES: [TreeVariety; 4] = [
    TreeVariety::Oak,
    TreeVariety::Spruce,
    TreeVariety::Birch,
    TreeVariety::Jungle,
];

/// Built-in pool of citizen names.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Ember", "Fern", "Grove", "Iris", "Juniper", "Lark", "Moss",
    "Pine", "Reed", "Sage", "Thorn", "Wren", "Yarrow",
];

/// The generated world and where things go in it.
#[derive(Debug)]
pub struct DemoWorld {
    /// The blocks.
    pub world: VoxelWorld,
    /// Location of the lumberjack hut.
    pub hut: BlockPos,
    /// Location of the workshop.
    pub workshop: BlockPos,
    /// Base log of every tree planted.
    pub trees: Vec<BlockPos>,
    /// Names for the citizens to spawn, without repeats.
    pub names: Vec<String>,
}

/// Generate the demo world for `config`.
///
/// # Errors
///
/// Returns [`EngineError::Generation`] if trees were asked for and none
/// fit on the plain.
pub fn generate(config: &WorldConfig, citizens: usize) -> Result<DemoWorld, EngineError> {
    let size = config.size.max(MIN_SIZE);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut world = VoxelWorld::new();
    world.fill(
        BlockPos::new(size.saturating_neg(), SOIL_Y, size.saturating_neg()),
        BlockPos::new(size, SOIL_Y, size),
        BlockKind::Dirt,
    );
    world.fill(
        BlockPos::new(size.saturating_neg(), GROUND_Y, size.saturating_neg()),
        BlockPos::new(size, GROUND_Y, size),
        BlockKind::Grass,
    );

    let wanted = usize::try_from(config.tree_count).unwrap_or(usize::MAX);
    let edge = size.saturating_sub(2);
    let mut trees: Vec<BlockPos> = Vec::new();
    for _ in 0..wanted.saturating_mul(8) {
        if trees.len() >= wanted {
            break;
        }
        let x = rng.random_range(edge.saturating_neg()..=edge);
        let z = rng.random_range(edge.saturating_neg()..=edge);
        if x.unsigned_abs() <= CENTRE_CLEARANCE && z.unsigned_abs() <= CENTRE_CLEARANCE {
            continue;
        }
        let base = BlockPos::new(x, FLOOR_Y, z);
        if trees.iter().any(|other| other.distance_sq(base) < TREE_SPACING_SQ) {
            continue;
        }
        let height = rng.random_range(4..=6);
        let variety = VARIETIES
            .get(rng.random_range(0..VARIETIES.len()))
            .copied()
            .unwrap_or(TreeVariety::Oak);
        plant(&mut world, base, variety, height);
        trees.push(base);
    }

    if trees.is_empty() && wanted > 0 {
        return Err(EngineError::Generation {
            message: format!("no room for trees on a plain of half-extent {size}"),
        });
    }

    let names = pick_unique_names(&mut rng, citizens);
    info!(
        seed = config.seed,
        size,
        trees = trees.len(),
        "Demo world generated"
    );
    Ok(DemoWorld {
        world,
        hut: BlockPos::new(0, FLOOR_Y, 0),
        workshop: BlockPos::new(2, FLOOR_Y, 0),
        trees,
        names,
    })
}

/// A trunk of `height` logs on `base`, with 3x3 leaf layers on its top two
/// logs and one leaf above.
fn plant(world: &mut VoxelWorld, base: BlockPos, variety: TreeVariety, height: i32) {
    let top = base.y.saturating_add(height.saturating_sub(1));
    for y in [top.saturating_sub(1), top] {
        world.fill(
            BlockPos::new(base.x.saturating_sub(1), y, base.z.saturating_sub(1)),
            BlockPos::new(base.x.saturating_add(1), y, base.z.saturating_add(1)),
            BlockKind::Leaves(variety),
        );
    }
    world.fill(base, BlockPos::new(base.x, top, base.z), BlockKind::Log(variety));
    world.set_block(
        BlockPos::new(base.x, top.saturating_add(1), base.z),
        BlockKind::Leaves(variety),
    );
}

/// Pick `count` names from the pool without repeats, numbering them once
/// the pool runs out.
fn pick_unique_names<R: Rng>(rng: &mut R, count: usize) -> Vec<String> {
    let mut pool: Vec<&str> = NAME_POOL.to_vec();
    let pool_len = pool.len();
    for i in 0..count.min(pool_len) {
        let j = rng.random_range(i..pool_len);
        pool.swap(i, j);
    }

    (0..count)
        .map(|i| {
            let name = pool.get(i.checked_rem(pool_len).unwrap_or(0)).copied().unwrap_or("Citizen");
            if i < pool_len {
                name.to_owned()
            } else {
                format!("{name} {}", i.checked_div(pool_len).unwrap_or(0).saturating_add(1))
            }
        })
        .collect()
}
