//! Headless engine for the Colonies simulation.
//!
//! Wires a seeded demo world, a lumberjack hut, a workshop and their
//! citizens into a [`Colony`], then runs the tick loop for the configured
//! number of ticks.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$COLONIES_CONFIG` or `colonies.yaml`
//! 2. Initialize structured logging (tracing) at the configured level
//! 3. Generate the demo world
//! 4. Place the buildings and stock the hut with an axe
//! 5. Spawn and employ the citizens
//! 6. Run the tick loop
//! 7. Log the result, and write a snapshot to `$COLONIES_SNAPSHOT` if set

mod demo_world;
mod error;

use std::path::PathBuf;
use std::sync::Arc;

use colonies_core::{BuildingKind, Colony, ColonyConfig, JobRegistry};
use colonies_types::{BlockKind, CitizenStatus, ItemKind, ItemStack};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "COLONIES_CONFIG";

/// Config file used when `CONFIG_ENV` is unset.
const DEFAULT_CONFIG: &str = "colonies.yaml";

/// Environment variable naming the snapshot output file.
const SNAPSHOT_ENV: &str = "COLONIES_SNAPSHOT";

/// Ticks between progress lines.
const PROGRESS_EVERY: u64 = 100;

/// Citizens spawned: the lumberjack and the workshop hand.
const CITIZENS: usize = 2;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the tick loop fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("colonies-engine starting");
    if let Some(path) = source {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }
    info!(
        colony = config.world.name,
        seed = config.world.seed,
        ticks = config.world.ticks,
        "Colony configured"
    );

    run(config)?;
    Ok(())
}

/// Build the colony and run it to completion.
fn run(config: ColonyConfig) -> Result<(), EngineError> {
    // 3. Generate the demo world.
    let demo = demo_world::generate(&config.world, CITIZENS)?;
    let trees_planted = demo.trees.len();

    let registry = Arc::new(JobRegistry::with_defaults()?);
    let ticks = config.world.ticks;
    let mut colony = Colony::new(config, registry, demo.world);

    // 4. Place the buildings.
    let hut = colony.add_building(BuildingKind::LumberjackHut, demo.hut);
    let workshop = colony.add_building(BuildingKind::Workshop, demo.workshop);
    if let Some(building) = colony.building_mut(hut) {
        if let Some(lost) = building
            .inventory_mut()
            .add_stack(ItemStack::new(ItemKind::Axe, 1))
        {
            warn!(?lost, "hut cannot hold the starting axe");
        }
    }

    // 5. Spawn and employ the citizens.
    let mut names = demo.names.into_iter();
    for (building, position) in [(hut, demo.hut), (workshop, demo.workshop)] {
        let name = names.next().unwrap_or_else(|| "Citizen".to_owned());
        let citizen = colony.spawn_citizen(name, position);
        colony.assign_job(citizen, building)?;
    }
    info!(
        citizens = colony.citizens().count(),
        buildings = colony.buildings().count(),
        trees = trees_planted,
        "Colony populated, entering tick loop"
    );

    // 6. Run the tick loop.
    for _ in 0..ticks {
        let report = colony.tick()?;
        if report.tick.checked_rem(PROGRESS_EVERY) == Some(0) {
            info!(
                tick = report.tick,
                working = report.count(CitizenStatus::Working),
                idle = report.count(CitizenStatus::Idle),
                logs_stored = stored_logs(&colony),
                "Progress"
            );
        }
    }

    // 7. Log the result.
    let world = colony.world();
    info!(
        total_ticks = colony.tick_count(),
        logs_stored = stored_logs(&colony),
        logs_standing = world.count_matching(|kind| kind.log_variety().is_some()),
        saplings = world.count_matching(|kind| matches!(kind, BlockKind::Sapling(_))),
        "colonies-engine shutdown complete"
    );

    if let Some(path) = std::env::var_os(SNAPSHOT_ENV).map(PathBuf::from) {
        let json = colony.snapshot()?.to_json()?;
        std::fs::write(&path, json)?;
        info!(path = %path.display(), "Snapshot written");
    }
    Ok(())
}

/// Logs of every variety held in building storage.
fn stored_logs(colony: &Colony) -> u32 {
    demo_world::VARIETIES
        .iter()
        .fold(0_u32, |acc, variety| {
            acc.saturating_add(colony.stored(ItemKind::Log(*variety)))
        })
}

/// Load the colony configuration.
///
/// Reads the file named by `$COLONIES_CONFIG`, falling back to
/// `colonies.yaml` in the working directory. A missing file means defaults.
fn load_config() -> Result<(ColonyConfig, Option<PathBuf>), EngineError> {
    let path = std::env::var_os(CONFIG_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    if path.exists() {
        let config = ColonyConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((ColonyConfig::default(), None))
    }
}
