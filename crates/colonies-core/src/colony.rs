//! The colony: its world, buildings, and citizens, and the tick that
//! drives them.
//!
//! Each tick runs every employed citizen once, in id order:
//!
//! 1. **Deliver** -- items the citizen's job is waiting for are moved out
//!    of its workplace's storage through a transaction.
//! 2. **Work** -- the job ticks with a [`JobContext`] over the citizen and
//!    the shared world.
//! 3. **Record** -- the returned status is stored on the citizen, and a
//!    working tick earns one point of experience.
//!
//! [`Colony::snapshot`] captures the whole colony, jobs included, as a
//! [`ColonySnapshot`] that serializes to JSON.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use colonies_transactions::SlotInventory;
use colonies_types::{
    BlockKind, BlockPos, BuildingId, CitizenId, CitizenStatus, ColonyId, ItemKind, ItemStack,
};
use colonies_world::{PathingHelperChain, VoxelWorld};

use crate::building::{Building, BuildingKind};
use crate::citizen::{Citizen, CitizenRecord};
use crate::config::ColonyConfig;
use crate::error::CoreError;
use crate::job::{Job, JobContext, JobRegistry, PLACEHOLDER};
use crate::storage;

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// What the citizens did on one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// The tick that ran.
    pub tick: u64,
    /// Number of citizens per reported status.
    pub statuses: BTreeMap<CitizenStatus, usize>,
}

impl TickReport {
    /// Number of citizens that reported `status`.
    pub fn count(&self, status: CitizenStatus) -> usize {
        self.statuses.get(&status).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Colony
// ---------------------------------------------------------------------------

/// A colony and everything it owns.
#[derive(Debug)]
pub struct Colony {
    id: ColonyId,
    name: String,
    tick: u64,
    config: ColonyConfig,
    registry: Arc<JobRegistry>,
    helpers: Arc<PathingHelperChain>,
    world: VoxelWorld,
    citizens: BTreeMap<CitizenId, Citizen>,
    buildings: BTreeMap<BuildingId, Building>,
}

impl Colony {
    /// A colony named after `config.world.name`, with no citizens or
    /// buildings yet.
    pub fn new(config: ColonyConfig, registry: Arc<JobRegistry>, world: VoxelWorld) -> Self {
        Self {
            id: ColonyId::new(),
            name: config.world.name.clone(),
            tick: 0,
            config,
            registry,
            helpers: Arc::new(PathingHelperChain::with_defaults()),
            world,
            citizens: BTreeMap::new(),
            buildings: BTreeMap::new(),
        }
    }

    /// Replace the pathing helpers every job uses.
    #[must_use]
    pub fn with_helpers(mut self, helpers: Arc<PathingHelperChain>) -> Self {
        self.helpers = helpers;
        self
    }

    /// The colony's id.
    pub const fn id(&self) -> ColonyId {
        self.id
    }

    /// The colony's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of ticks run so far.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The configuration the colony runs with.
    pub const fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// The job registry.
    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// The block world.
    pub const fn world(&self) -> &VoxelWorld {
        &self.world
    }

    /// Mutable access to the block world.
    pub const fn world_mut(&mut self) -> &mut VoxelWorld {
        &mut self.world
    }

    /// A building by id.
    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    /// Mutable access to a building.
    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    /// Every building, in id order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    /// A citizen by id.
    pub fn citizen(&self, id: CitizenId) -> Option<&Citizen> {
        self.citizens.get(&id)
    }

    /// Mutable access to a citizen.
    pub fn citizen_mut(&mut self, id: CitizenId) -> Option<&mut Citizen> {
        self.citizens.get_mut(&id)
    }

    /// Every citizen, in id order.
    pub fn citizens(&self) -> impl Iterator<Item = &Citizen> {
        self.citizens.values()
    }

    /// Units of `item` held across all building storage.
    pub fn stored(&self, item: ItemKind) -> u32 {
        self.buildings
            .values()
            .fold(0_u32, |acc, b| acc.saturating_add(b.inventory().count_of(item)))
    }

    // -----------------------------------------------------------------------
    // Population
    // -----------------------------------------------------------------------

    /// Place a building of `kind` at `location` with the configured storage
    /// size.
    pub fn add_building(&mut self, kind: BuildingKind, location: BlockPos) -> BuildingId {
        let building = Building::new(kind, location, self.config.inventory.hut_slots);
        let id = building.id();
        info!(building = %id, ?kind, %location, "building placed");
        self.buildings.insert(id, building);
        id
    }

    /// Spawn an unemployed citizen at `position`.
    pub fn spawn_citizen(&mut self, name: impl Into<String>, position: BlockPos) -> CitizenId {
        let citizen = Citizen::new(name, position, self.config.inventory.citizen_slots);
        let id = citizen.id();
        info!(citizen = %id, name = citizen.name(), %position, "citizen spawned");
        self.citizens.insert(id, citizen);
        id
    }

    /// Employ `citizen` at `building` with a fresh job of the building's
    /// kind. Buildings without a job of their own hand out a placeholder.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownCitizen`], [`CoreError::UnknownBuilding`],
    /// [`CoreError::BuildingFull`], or [`CoreError::UnknownJob`] if the job
    /// kind is not registered.
    pub fn assign_job(&mut self, citizen: CitizenId, building: BuildingId) -> Result<(), CoreError> {
        let worker = self
            .citizens
            .get_mut(&citizen)
            .ok_or(CoreError::UnknownCitizen(citizen))?;
        let workplace = self
            .buildings
            .get_mut(&building)
            .ok_or(CoreError::UnknownBuilding(building))?;

        let kind = workplace.kind().job_kind().unwrap_or(PLACEHOLDER);
        let job = self.registry.create(kind)?;
        workplace.add_worker(citizen)?;

        if let Some(previous) = worker.work_building.filter(|id| *id != building) {
            if let Some(old) = self.buildings.get_mut(&previous) {
                old.remove_worker(citizen);
            }
        }
        worker.job = Some(job);
        worker.work_building = Some(building);
        info!(%citizen, %building, job = kind, "job assigned");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick for every citizen.
    ///
    /// # Errors
    ///
    /// Propagates the first job or transaction error; citizens after the
    /// failing one do not run this tick.
    pub fn tick(&mut self) -> Result<TickReport, CoreError> {
        let tick = self.tick;
        let mut report = TickReport {
            tick,
            statuses: BTreeMap::new(),
        };

        for citizen in self.citizens.values_mut() {
            let status = run_citizen(
                citizen,
                tick,
                &mut self.buildings,
                &mut self.world,
                &self.helpers,
                &self.config,
            )?;
            let entry = report.statuses.entry(status).or_insert(0);
            *entry = entry.saturating_add(1);
        }

        self.tick = self.tick.saturating_add(1);
        debug!(tick, statuses = ?report.statuses, "tick complete");
        Ok(report)
    }

    /// Run `ticks` ticks and return the last report.
    ///
    /// # Errors
    ///
    /// Stops at the first failing tick.
    pub fn run(&mut self, ticks: u64) -> Result<Option<TickReport>, CoreError> {
        let mut last = None;
        for _ in 0..ticks {
            last = Some(self.tick()?);
        }
        Ok(last)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the colony's state.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownJob`] or [`CoreError::JobState`] if a citizen's
    /// job cannot be saved.
    pub fn snapshot(&self) -> Result<ColonySnapshot, CoreError> {
        let citizens = self
            .citizens
            .values()
            .map(|citizen| citizen.to_record(&self.registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ColonySnapshot {
            id: self.id,
            name: self.name.clone(),
            tick: self.tick,
            saved_at: Utc::now(),
            blocks: self
                .world
                .iter()
                .map(|(pos, kind)| PlacedBlock { pos, kind })
                .collect(),
            buildings: self.buildings.values().cloned().collect(),
            citizens,
        })
    }

    /// Rebuild a colony from a snapshot.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownJob`] or [`CoreError::JobState`] if a saved job
    /// cannot be restored.
    pub fn restore(
        snapshot: ColonySnapshot,
        config: ColonyConfig,
        registry: Arc<JobRegistry>,
    ) -> Result<Self, CoreError> {
        let mut world = VoxelWorld::new();
        for block in snapshot.blocks {
            world.set_block(block.pos, block.kind);
        }
        let citizens = snapshot
            .citizens
            .into_iter()
            .map(|record| Citizen::from_record(record, &registry).map(|c| (c.id(), c)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let buildings = snapshot
            .buildings
            .into_iter()
            .map(|building| (building.id(), building))
            .collect();

        info!(colony = %snapshot.id, tick = snapshot.tick, saved_at = %snapshot.saved_at, "colony restored");
        Ok(Self {
            id: snapshot.id,
            name: snapshot.name,
            tick: snapshot.tick,
            config,
            registry,
            helpers: Arc::new(PathingHelperChain::with_defaults()),
            world,
            citizens,
            buildings,
        })
    }
}

/// One citizen's share of a tick.
fn run_citizen(
    citizen: &mut Citizen,
    tick: u64,
    buildings: &mut BTreeMap<BuildingId, Building>,
    world: &mut VoxelWorld,
    helpers: &Arc<PathingHelperChain>,
    config: &ColonyConfig,
) -> Result<CitizenStatus, CoreError> {
    let Some(job) = citizen.job.as_mut() else {
        citizen.status = CitizenStatus::Idle;
        return Ok(CitizenStatus::Idle);
    };
    let mut workplace = citizen.work_building.and_then(|id| buildings.get_mut(&id));
    if let Some(building) = workplace.as_deref_mut() {
        deliver_needed(&mut **job, &mut citizen.inventory, building.inventory_mut())?;
    }

    let mut ctx = JobContext {
        tick,
        citizen: citizen.id,
        position: &mut citizen.position,
        inventory: &mut citizen.inventory,
        workplace,
        world,
        helpers,
        config,
    };
    let status = job.tick(&mut ctx)?;

    citizen.status = status;
    if status == CitizenStatus::Working {
        let gained = citizen.add_experience(1);
        if gained > 0 {
            info!(citizen = %citizen.id, level = citizen.level, "citizen levelled up");
        }
    }
    Ok(status)
}

/// Hand a job what it has asked for, as far as `storage` holds it.
fn deliver_needed(
    job: &mut dyn Job,
    inventory: &mut SlotInventory,
    storage: &mut SlotInventory,
) -> Result<(), CoreError> {
    let needed: Vec<ItemStack> = job.items_needed().to_vec();
    for stack in needed {
        let moved = storage::transfer(inventory, storage, stack.item, stack.count)?;
        if moved > 0 {
            debug!(item = ?stack.item, moved, "needed items delivered");
            job.common_mut().remove_item_needed(stack.with_count(moved));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A non-air block in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedBlock {
    /// Where the block is.
    pub pos: BlockPos,
    /// What it is.
    pub kind: BlockKind,
}

/// Everything needed to rebuild a [`Colony`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonySnapshot {
    /// The colony's id.
    pub id: ColonyId,
    /// The colony's name.
    pub name: String,
    /// Ticks run when the snapshot was taken.
    pub tick: u64,
    /// Wall-clock time the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Every non-air block.
    pub blocks: Vec<PlacedBlock>,
    /// Every building.
    pub buildings: Vec<Building>,
    /// Every citizen, jobs included.
    pub citizens: Vec<CitizenRecord>,
}

impl ColonySnapshot {
    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`CoreError::Snapshot`] if encoding fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// [`CoreError::Snapshot`] if the JSON does not describe a snapshot.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::LUMBERJACK;

    fn colony() -> Colony {
        let registry = Arc::new(JobRegistry::with_defaults().unwrap_or_default());
        Colony::new(ColonyConfig::default(), registry, VoxelWorld::new())
    }

    #[test]
    fn hut_hands_out_its_job() {
        let mut colony = colony();
        let hut = colony.add_building(BuildingKind::LumberjackHut, BlockPos::new(0, 64, 0));
        let bob = colony.spawn_citizen("Bob", BlockPos::new(1, 64, 0));
        assert!(colony.assign_job(bob, hut).is_ok());

        let citizen = colony.citizen(bob);
        assert_eq!(citizen.and_then(Citizen::job).map(Job::kind), Some(LUMBERJACK));
        assert_eq!(citizen.and_then(Citizen::work_building), Some(hut));
        assert_eq!(colony.building(hut).map(Building::workers), Some(&[bob][..]));
    }

    #[test]
    fn workshop_hands_out_a_placeholder() {
        let mut colony = colony();
        let shop = colony.add_building(BuildingKind::Workshop, BlockPos::new(0, 64, 0));
        let ann = colony.spawn_citizen("Ann", BlockPos::new(0, 64, 0));
        assert!(colony.assign_job(ann, shop).is_ok());
        assert_eq!(
            colony.citizen(ann).and_then(Citizen::job).map(Job::kind),
            Some(PLACEHOLDER)
        );

        let report = colony.tick().unwrap_or_default();
        assert_eq!(report.count(CitizenStatus::Idle), 1);
        assert_eq!(colony.tick_count(), 1);
    }

    #[test]
    fn second_worker_is_turned_away() {
        let mut colony = colony();
        let hut = colony.add_building(BuildingKind::LumberjackHut, BlockPos::new(0, 64, 0));
        let first = colony.spawn_citizen("First", BlockPos::default());
        let second = colony.spawn_citizen("Second", BlockPos::default());
        assert!(colony.assign_job(first, hut).is_ok());
        assert!(matches!(
            colony.assign_job(second, hut),
            Err(CoreError::BuildingFull { .. })
        ));
        assert!(colony.citizen(second).and_then(Citizen::job).is_none());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut colony = colony();
        let hut = colony.add_building(BuildingKind::Workshop, BlockPos::default());
        assert!(matches!(
            colony.assign_job(CitizenId::new(), hut),
            Err(CoreError::UnknownCitizen(_))
        ));
        let ann = colony.spawn_citizen("Ann", BlockPos::default());
        assert!(matches!(
            colony.assign_job(ann, BuildingId::new()),
            Err(CoreError::UnknownBuilding(_))
        ));
    }

    #[test]
    fn axe_is_delivered_from_the_hut() {
        let mut colony = colony();
        let hut = colony.add_building(BuildingKind::LumberjackHut, BlockPos::new(0, 64, 0));
        if let Some(building) = colony.building_mut(hut) {
            building
                .inventory_mut()
                .add_stack(ItemStack::new(ItemKind::Axe, 1));
        }
        let bob = colony.spawn_citizen("Bob", BlockPos::new(0, 64, 0));
        assert!(colony.assign_job(bob, hut).is_ok());

        let report = colony.tick().unwrap_or_default();
        assert_eq!(report.count(CitizenStatus::NeedAssistance), 1);
        let report = colony.tick().unwrap_or_default();
        assert_eq!(report.count(CitizenStatus::NeedAssistance), 0);

        let citizen = colony.citizen(bob);
        assert_eq!(
            citizen.map(|c| c.inventory().count_of(ItemKind::Axe)),
            Some(1)
        );
        assert_eq!(colony.stored(ItemKind::Axe), 0);
        assert!(
            citizen
                .and_then(Citizen::job)
                .is_some_and(|job| !job.is_missing_needed_item())
        );
    }
}
