//! Buildings (huts) placed in a colony.

use serde::{Deserialize, Serialize};

use colonies_transactions::SlotInventory;
use colonies_types::{BlockPos, BuildingId, CitizenId};

use crate::error::CoreError;
use crate::job::{LUMBERJACK, PLACEHOLDER};

/// Highest level a building can be upgraded to.
pub const MAX_BUILDING_LEVEL: u32 = 5;

/// The kinds of building a colony can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    /// The colony's central building. Stores goods, employs no one.
    TownHall,
    /// Employs a lumberjack and stores the logs it brings back.
    LumberjackHut,
    /// A generic workplace whose worker has nothing to do yet.
    Workshop,
}

impl BuildingKind {
    /// Schematic name used for display and logging.
    pub const fn schematic_name(self) -> &'static str {
        match self {
            Self::TownHall => "TownHall",
            Self::LumberjackHut => "Lumberjack",
            Self::Workshop => "Workshop",
        }
    }

    /// Registry key of the job this building employs for.
    pub const fn job_kind(self) -> Option<&'static str> {
        match self {
            Self::TownHall => None,
            Self::LumberjackHut => Some(LUMBERJACK),
            Self::Workshop => Some(PLACEHOLDER),
        }
    }

    /// How many citizens the building employs.
    pub const fn max_workers(self) -> usize {
        match self {
            Self::TownHall => 0,
            Self::LumberjackHut | Self::Workshop => 1,
        }
    }
}

/// A placed building with its storage and workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    id: BuildingId,
    kind: BuildingKind,
    location: BlockPos,
    level: u32,
    inventory: SlotInventory,
    workers: Vec<CitizenId>,
}

impl Building {
    /// A level-1 building with an empty inventory of `slots` slots.
    pub fn new(kind: BuildingKind, location: BlockPos, slots: usize) -> Self {
        Self {
            id: BuildingId::new(),
            kind,
            location,
            level: 1,
            inventory: SlotInventory::new(slots),
            workers: Vec::new(),
        }
    }

    /// The building's id.
    pub const fn id(&self) -> BuildingId {
        self.id
    }

    /// The building's kind.
    pub const fn kind(&self) -> BuildingKind {
        self.kind
    }

    /// The building's hut block.
    pub const fn location(&self) -> BlockPos {
        self.location
    }

    /// The current level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Raise the level by one, up to [`MAX_BUILDING_LEVEL`]. Returns whether
    /// the level changed.
    pub fn upgrade(&mut self) -> bool {
        if self.level >= MAX_BUILDING_LEVEL {
            return false;
        }
        self.level = self.level.saturating_add(1);
        true
    }

    /// The building's storage.
    pub const fn inventory(&self) -> &SlotInventory {
        &self.inventory
    }

    /// Mutable storage.
    pub const fn inventory_mut(&mut self) -> &mut SlotInventory {
        &mut self.inventory
    }

    /// Citizens employed here.
    pub fn workers(&self) -> &[CitizenId] {
        &self.workers
    }

    /// Whether another worker can be employed.
    pub fn has_free_slot(&self) -> bool {
        self.workers.len() < self.kind.max_workers()
    }

    /// Employ `citizen`. Adding a citizen already employed here is a no-op.
    ///
    /// # Errors
    ///
    /// [`CoreError::BuildingFull`] when every worker slot is taken.
    pub fn add_worker(&mut self, citizen: CitizenId) -> Result<(), CoreError> {
        if self.workers.contains(&citizen) {
            return Ok(());
        }
        if !self.has_free_slot() {
            return Err(CoreError::BuildingFull {
                building: self.id,
                capacity: self.kind.max_workers(),
            });
        }
        self.workers.push(citizen);
        Ok(())
    }

    /// Stop employing `citizen`. Returns whether it was employed here.
    pub fn remove_worker(&mut self, citizen: CitizenId) -> bool {
        let before = self.workers.len();
        self.workers.retain(|worker| *worker != citizen);
        self.workers.len() != before
    }
}
