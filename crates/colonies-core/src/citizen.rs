//! Citizens: the colony's workers.

use serde::{Deserialize, Serialize};

use colonies_transactions::SlotInventory;
use colonies_types::{BlockPos, BuildingId, CitizenId, CitizenStatus};

use crate::error::CoreError;
use crate::job::{Job, JobRegistry, SavedJob};

/// Experience needed per level to reach the next one.
pub const EXPERIENCE_PER_LEVEL: u64 = 100;

/// A worker living in the colony.
#[derive(Debug)]
pub struct Citizen {
    pub(crate) id: CitizenId,
    pub(crate) name: String,
    pub(crate) position: BlockPos,
    pub(crate) status: CitizenStatus,
    pub(crate) inventory: SlotInventory,
    pub(crate) job: Option<Box<dyn Job>>,
    pub(crate) work_building: Option<BuildingId>,
    pub(crate) experience: u64,
    pub(crate) level: u32,
}

impl Citizen {
    /// An unemployed level-1 citizen with an empty inventory.
    pub fn new(name: impl Into<String>, position: BlockPos, slots: usize) -> Self {
        Self {
            id: CitizenId::new(),
            name: name.into(),
            position,
            status: CitizenStatus::Idle,
            inventory: SlotInventory::new(slots),
            job: None,
            work_building: None,
            experience: 0,
            level: 1,
        }
    }

    /// The citizen's id.
    pub const fn id(&self) -> CitizenId {
        self.id
    }

    /// The citizen's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The block the citizen stands in.
    pub const fn position(&self) -> BlockPos {
        self.position
    }

    /// What the citizen did on the last tick.
    pub const fn status(&self) -> CitizenStatus {
        self.status
    }

    /// The citizen's inventory.
    pub const fn inventory(&self) -> &SlotInventory {
        &self.inventory
    }

    /// Mutable inventory.
    pub const fn inventory_mut(&mut self) -> &mut SlotInventory {
        &mut self.inventory
    }

    /// The citizen's job.
    pub fn job(&self) -> Option<&dyn Job> {
        self.job.as_deref()
    }

    /// The building the citizen works at.
    pub const fn work_building(&self) -> Option<BuildingId> {
        self.work_building
    }

    /// Accumulated experience.
    pub const fn experience(&self) -> u64 {
        self.experience
    }

    /// The citizen's level.
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Add experience, levelling up each time the current level's threshold
    /// is crossed. Returns the number of levels gained.
    pub fn add_experience(&mut self, xp: u64) -> u32 {
        self.experience = self.experience.saturating_add(xp);
        let mut gained = 0_u32;
        while self.experience >= EXPERIENCE_PER_LEVEL.saturating_mul(u64::from(self.level)) {
            self.level = self.level.saturating_add(1);
            gained = gained.saturating_add(1);
        }
        gained
    }

    /// Reset experience and level to a fresh citizen's.
    pub const fn reset_experience_and_level(&mut self) {
        self.experience = 0;
        self.level = 1;
    }

    /// Encode the citizen for a snapshot.
    pub fn to_record(&self, registry: &JobRegistry) -> Result<CitizenRecord, CoreError> {
        let job = self
            .job
            .as_deref()
            .map(|job| registry.save(job))
            .transpose()?;
        Ok(CitizenRecord {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            status: self.status,
            inventory: self.inventory.clone(),
            job,
            work_building: self.work_building,
            experience: self.experience,
            level: self.level,
        })
    }

    /// Rebuild a citizen from its snapshot record.
    pub fn from_record(record: CitizenRecord, registry: &JobRegistry) -> Result<Self, CoreError> {
        let job = record
            .job
            .as_ref()
            .map(|saved| registry.restore(saved))
            .transpose()?;
        Ok(Self {
            id: record.id,
            name: record.name,
            position: record.position,
            status: record.status,
            inventory: record.inventory,
            job,
            work_building: record.work_building,
            experience: record.experience,
            level: record.level,
        })
    }
}

/// A citizen as written to a colony snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecord {
    /// The citizen's id.
    pub id: CitizenId,
    /// The citizen's name.
    pub name: String,
    /// The block the citizen stood in.
    pub position: BlockPos,
    /// Status on the last tick.
    pub status: CitizenStatus,
    /// The citizen's inventory.
    pub inventory: SlotInventory,
    /// The citizen's job, if employed.
    pub job: Option<SavedJob>,
    /// The building the citizen works at.
    pub work_building: Option<BuildingId>,
    /// Accumulated experience.
    pub experience: u64,
    /// The citizen's level.
    pub level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::LUMBERJACK;

    #[test]
    fn experience_levels_up_at_thresholds() {
        let mut citizen = Citizen::new("Ada", BlockPos::default(), 4);
        assert_eq!(citizen.add_experience(99), 0);
        assert_eq!(citizen.level(), 1);
        assert_eq!(citizen.add_experience(1), 1);
        assert_eq!(citizen.level(), 2);
        assert_eq!(citizen.add_experience(150), 1);
        assert_eq!(citizen.level(), 3);
        citizen.reset_experience_and_level();
        assert_eq!((citizen.experience(), citizen.level()), (0, 1));
    }

    #[test]
    fn record_round_trip_keeps_job() {
        let registry = JobRegistry::with_defaults().unwrap_or_default();
        let mut citizen = Citizen::new("Bo", BlockPos::new(1, 64, 1), 4);
        citizen.job = registry.create(LUMBERJACK).ok();

        let record = citizen.to_record(&registry);
        assert!(record.is_ok());
        let Ok(record) = record else {
            return;
        };
        let restored = Citizen::from_record(record.clone(), &registry);
        assert!(restored.is_ok());
        if let Ok(restored) = restored {
            assert_eq!(restored.id(), citizen.id());
            assert_eq!(restored.job().map(Job::kind), Some(LUMBERJACK));
            assert_eq!(restored.to_record(&registry).ok(), Some(record));
        }
    }
}
