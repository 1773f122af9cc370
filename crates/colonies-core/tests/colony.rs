//! End-to-end colony runs: a lumberjack working out of its hut, and
//! snapshots taken mid-run.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use colonies_core::{
    BuildingKind, Citizen, Colony, ColonyConfig, ColonySnapshot, JobRegistry, LumberjackJob,
    LumberjackState,
};
use colonies_types::{BlockKind, BlockPos, CitizenStatus, ItemKind, ItemStack, TreeVariety};
use colonies_world::VoxelWorld;

const OAK: TreeVariety = TreeVariety::Oak;

/// Flat grass with one four-log oak at (4, 64, 2).
fn forest() -> VoxelWorld {
    let mut world = VoxelWorld::new();
    world.fill(BlockPos::new(-8, 63, -8), BlockPos::new(8, 63, 8), BlockKind::Grass);
    world.fill(BlockPos::new(3, 67, 1), BlockPos::new(5, 67, 3), BlockKind::Leaves(OAK));
    world.fill(BlockPos::new(4, 64, 2), BlockPos::new(4, 67, 2), BlockKind::Log(OAK));
    world.set_block(BlockPos::new(4, 68, 2), BlockKind::Leaves(OAK));
    world
}

fn colony() -> (Colony, colonies_types::CitizenId) {
    let registry = Arc::new(JobRegistry::with_defaults().unwrap());
    let mut colony = Colony::new(ColonyConfig::default(), registry, forest());
    let hut = colony.add_building(BuildingKind::LumberjackHut, BlockPos::new(0, 64, 0));
    colony
        .building_mut(hut)
        .unwrap()
        .inventory_mut()
        .add_stack(ItemStack::new(ItemKind::Axe, 1));
    let lumberjack = colony.spawn_citizen("Ingrid", BlockPos::new(0, 64, 0));
    colony.assign_job(lumberjack, hut).unwrap();
    (colony, lumberjack)
}

#[test]
fn lumberjack_stores_a_whole_tree() {
    let (mut colony, lumberjack) = colony();

    for _ in 0..200 {
        colony.tick().unwrap();
        if colony.stored(ItemKind::Log(OAK)) == 4 {
            break;
        }
    }

    assert_eq!(colony.stored(ItemKind::Log(OAK)), 4);
    assert_eq!(
        colony.world().count_matching(|kind| kind.log_variety().is_some()),
        0
    );
    assert_eq!(colony.world().block(BlockPos::new(4, 64, 2)), BlockKind::Sapling(OAK));

    let citizen = colony.citizen(lumberjack).unwrap();
    assert_eq!(citizen.inventory().count_of(ItemKind::Axe), 1);
    assert!(citizen.experience() > 0);

    let report = colony.tick().unwrap();
    assert_eq!(report.count(CitizenStatus::Idle), 1);
}

#[test]
fn snapshot_resumes_mid_tree() {
    let (mut colony, lumberjack) = colony();
    colony.run(6).unwrap();

    let json = colony.snapshot().unwrap().to_json().unwrap();
    let snapshot = ColonySnapshot::from_json(&json).unwrap();
    assert_eq!(snapshot.tick, 6);
    assert_eq!(snapshot.citizens.len(), 1);

    let saved = snapshot.citizens.first().and_then(|c| c.job.clone()).unwrap();
    assert_eq!(saved.kind, "Lumberjack");
    let job: LumberjackJob = serde_json::from_value(saved.state).unwrap();
    assert_ne!(job.state(), LumberjackState::Idle);

    let registry = Arc::new(JobRegistry::with_defaults().unwrap());
    let mut restored = Colony::restore(snapshot, ColonyConfig::default(), registry).unwrap();
    assert_eq!(restored.id(), colony.id());
    assert_eq!(restored.tick_count(), 6);
    assert_eq!(restored.world(), colony.world());
    assert_eq!(
        restored.citizen(lumberjack).map(Citizen::position),
        colony.citizen(lumberjack).map(Citizen::position)
    );

    for _ in 0..200 {
        restored.tick().unwrap();
        if restored.stored(ItemKind::Log(OAK)) == 4 {
            break;
        }
    }
    assert_eq!(restored.stored(ItemKind::Log(OAK)), 4);
}

#[test]
fn broken_snapshot_is_a_snapshot_error() {
    assert!(matches!(
        ColonySnapshot::from_json("{\"id\": 3}"),
        Err(colonies_core::CoreError::Snapshot { .. })
    ));
}
