//! Error types for the `colonies-core` crate.

use colonies_transactions::TransactionError;
use colonies_types::{BuildingId, CitizenId};
use colonies_world::WorldError;

use crate::config::ConfigError;

/// Errors raised by the job registry, the colony, and its snapshots.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A job key was registered twice.
    #[error("duplicate job type '{0}'")]
    DuplicateJob(String),

    /// A job key has no registered constructor.
    #[error("unknown job type '{0}'")]
    UnknownJob(String),

    /// A saved job's state could not be decoded or encoded.
    #[error("job '{kind}' state cannot be restored: {source}")]
    JobState {
        /// The job key.
        kind: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// No building with this id exists in the colony.
    #[error("unknown building {0}")]
    UnknownBuilding(BuildingId),

    /// No citizen with this id exists in the colony.
    #[error("unknown citizen {0}")]
    UnknownCitizen(CitizenId),

    /// A building has no free worker slot.
    #[error("building {building} already has {capacity} workers")]
    BuildingFull {
        /// The full building.
        building: BuildingId,
        /// Its worker capacity.
        capacity: usize,
    },

    /// A colony snapshot could not be written or read.
    #[error("snapshot serialization failed: {source}")]
    Snapshot {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A transaction was driven out of order.
    #[error("transaction error: {source}")]
    Transaction {
        /// The underlying transaction error.
        #[from]
        source: TransactionError,
    },

    /// A world query failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Configuration could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },
}
