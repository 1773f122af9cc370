//! Jobs and the registry that creates and restores them.
//!
//! A [`Job`] is the per-citizen work strategy: one [`Job::tick`] per colony
//! tick. Saved jobs are `{ kind, state }` records; the [`JobRegistry`] maps
//! each kind to a constructor closure that rebuilds the job from its state.
//! The registry is an ordinary value built once at startup and shared by
//! reference, with no global mapping behind it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use colonies_transactions::SlotInventory;
use colonies_types::{BlockPos, CitizenId, CitizenStatus, ItemStack};
use colonies_world::{PathingHelperChain, VoxelWorld};

use crate::building::Building;
use crate::config::ColonyConfig;
use crate::error::CoreError;
use crate::jobs::{LumberjackJob, PlaceholderJob};

// ---------------------------------------------------------------------------
// Shared job state
// ---------------------------------------------------------------------------

/// State every job carries: the items it is waiting for and a name tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCommon {
    /// Items the job cannot work without.
    #[serde(default)]
    pub items_needed: Vec<ItemStack>,
    /// Short description shown next to the citizen's name.
    #[serde(default)]
    pub name_tag: String,
}

impl JobCommon {
    /// Add `stack` to the needed items, merging with an entry of the same
    /// item.
    pub fn add_item_needed(&mut self, stack: ItemStack) {
        if let Some(needed) = self
            .items_needed
            .iter_mut()
            .find(|needed| needed.is_same_item(stack))
        {
            needed.count = needed.count.saturating_add(stack.count);
            return;
        }
        self.items_needed.push(stack);
    }

    /// Mark `stack` as delivered. The matching entry shrinks by the
    /// delivered count and is dropped once satisfied; whatever exceeded it
    /// is returned.
    pub fn remove_item_needed(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let Some(index) = self
            .items_needed
            .iter()
            .position(|needed| needed.is_same_item(stack))
        else {
            return Some(stack);
        };
        let needed = self.items_needed.get_mut(index)?;
        let used = needed.count.min(stack.count);
        needed.count = needed.count.saturating_sub(used);
        if needed.is_empty() {
            self.items_needed.remove(index);
        }
        let rest = stack.count.saturating_sub(used);
        (rest > 0).then_some(stack.with_count(rest))
    }
}

// ---------------------------------------------------------------------------
// Job trait
// ---------------------------------------------------------------------------

/// Everything a job may touch during one tick.
#[derive(Debug)]
pub struct JobContext<'a> {
    /// The colony tick being run.
    pub tick: u64,
    /// The citizen doing the work.
    pub citizen: CitizenId,
    /// The citizen's block position; jobs move the citizen by writing it.
    pub position: &'a mut BlockPos,
    /// The citizen's inventory.
    pub inventory: &'a mut SlotInventory,
    /// The building the citizen works at, if any.
    pub workplace: Option<&'a mut Building>,
    /// The block world.
    pub world: &'a mut VoxelWorld,
    /// The shared pathing helpers.
    pub helpers: &'a Arc<PathingHelperChain>,
    /// Colony configuration.
    pub config: &'a ColonyConfig,
}

/// A citizen's work strategy.
pub trait Job: core::fmt::Debug {
    /// The registry key of this job kind.
    fn kind(&self) -> &'static str;

    /// Shared job state.
    fn common(&self) -> &JobCommon;

    /// Mutable shared job state.
    fn common_mut(&mut self) -> &mut JobCommon;

    /// Encode the job's state for a [`SavedJob`].
    fn save_state(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Run one step of work and report what the citizen is doing.
    fn tick(&mut self, ctx: &mut JobContext<'_>) -> Result<CitizenStatus, CoreError>;

    /// Whether the job is blocked on items it has asked for.
    fn is_missing_needed_item(&self) -> bool {
        !self.common().items_needed.is_empty()
    }

    /// The items the job is waiting for.
    fn items_needed(&self) -> &[ItemStack] {
        &self.common().items_needed
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// A job as written to a colony snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedJob {
    /// The registry key.
    pub kind: String,
    /// The job's own state.
    pub state: serde_json::Value,
}

/// Builds a job from saved state, or fresh when the state is `None`.
pub type JobConstructor =
    Box<dyn Fn(Option<serde_json::Value>) -> Result<Box<dyn Job>, serde_json::Error> + Send + Sync>;

/// Registry key of [`PlaceholderJob`].
pub const PLACEHOLDER: &str = "Placeholder";

/// Registry key of [`LumberjackJob`].
pub const LUMBERJACK: &str = "Lumberjack";

/// String key to constructor mapping for every known job kind.
#[derive(Default)]
pub struct JobRegistry {
    constructors: BTreeMap<String, JobConstructor>,
}

impl core::fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JobRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl JobRegistry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// The registry of the built-in jobs.
    pub fn with_defaults() -> Result<Self, CoreError> {
        let mut registry = Self::new();
        registry.register_serde::<PlaceholderJob>(PLACEHOLDER)?;
        registry.register_serde::<LumberjackJob>(LUMBERJACK)?;
        Ok(registry)
    }

    /// Register a constructor under `kind`.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateJob`] if `kind` is already registered.
    pub fn register(&mut self, kind: &str, constructor: JobConstructor) -> Result<(), CoreError> {
        if self.constructors.contains_key(kind) {
            return Err(CoreError::DuplicateJob(kind.to_owned()));
        }
        self.constructors.insert(kind.to_owned(), constructor);
        Ok(())
    }

    /// Register a job whose state is the job itself, serialized with serde.
    /// A fresh job is its [`Default`].
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateJob`] if `kind` is already registered.
    pub fn register_serde<J>(&mut self, kind: &str) -> Result<(), CoreError>
    where
        J: Job + Default + DeserializeOwned + 'static,
    {
        self.register(
            kind,
            Box::new(
                |state: Option<serde_json::Value>| -> Result<Box<dyn Job>, serde_json::Error> {
                    let job: J = state
                        .map(serde_json::from_value::<J>)
                        .transpose()?
                        .unwrap_or_default();
                    Ok(Box::new(job))
                },
            ),
        )
    }

    /// Whether `kind` is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered keys in order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// A fresh job of `kind`.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownJob`] if `kind` is not registered.
    pub fn create(&self, kind: &str) -> Result<Box<dyn Job>, CoreError> {
        self.build(kind, None)
    }

    /// Rebuild a job from a snapshot record.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownJob`] for an unregistered kind,
    /// [`CoreError::JobState`] if the state does not decode.
    pub fn restore(&self, saved: &SavedJob) -> Result<Box<dyn Job>, CoreError> {
        self.build(&saved.kind, Some(saved.state.clone()))
    }

    /// Encode `job` as a snapshot record.
    ///
    /// # Errors
    ///
    /// [`CoreError::UnknownJob`] if the job's kind is not registered, so
    /// it could never be restored. [`CoreError::JobState`] if its state does
    /// not encode.
    pub fn save(&self, job: &dyn Job) -> Result<SavedJob, CoreError> {
        let kind = job.kind();
        if !self.contains(kind) {
            error!(kind, "job kind has no registry mapping");
            return Err(CoreError::UnknownJob(kind.to_owned()));
        }
        let state = job.save_state().map_err(|source| CoreError::JobState {
            kind: kind.to_owned(),
            source,
        })?;
        Ok(SavedJob {
            kind: kind.to_owned(),
            state,
        })
    }

    fn build(
        &self,
        kind: &str,
        state: Option<serde_json::Value>,
    ) -> Result<Box<dyn Job>, CoreError> {
        let Some(constructor) = self.constructors.get(kind) else {
            warn!(kind, "unknown job type");
            return Err(CoreError::UnknownJob(kind.to_owned()));
        };
        constructor(state).map_err(|source| {
            error!(kind, %source, "job state cannot be restored");
            CoreError::JobState {
                kind: kind.to_owned(),
                source,
            }
        })
    }
}
