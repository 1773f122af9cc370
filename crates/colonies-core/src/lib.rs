//! Colony orchestration for the Colonies simulation.
//!
//! This crate owns the colony tick: citizens working jobs out of buildings,
//! moving items through transactions, and saving it all to snapshots.
//!
//! # Modules
//!
//! - [`building`] -- Buildings, their storage, and the jobs they offer.
//! - [`citizen`] -- Citizens with inventories, experience, and a job.
//! - [`colony`] -- The [`Colony`] tick loop and [`ColonySnapshot`].
//! - [`config`] -- Configuration loading from `colonies.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Error types for the registry, the colony, and snapshots.
//! - [`job`] -- The [`Job`] trait and the string-keyed [`JobRegistry`].
//! - [`jobs`] -- The built-in jobs.
//! - [`storage`] -- Transaction-backed transfers between inventories.

pub mod building;
pub mod citizen;
pub mod colony;
pub mod config;
pub mod error;
pub mod job;
pub mod jobs;
pub mod storage;

// Re-export primary types at crate root.
pub use building::{Building, BuildingKind};
pub use citizen::{Citizen, CitizenRecord};
pub use colony::{Colony, ColonySnapshot, PlacedBlock, TickReport};
pub use config::{ColonyConfig, ConfigError};
pub use error::CoreError;
pub use job::{Job, JobCommon, JobContext, JobRegistry, SavedJob};
pub use jobs::{LumberjackJob, LumberjackState, PlaceholderJob};
