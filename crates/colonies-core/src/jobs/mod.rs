//! The built-in jobs.
//!
//! # Submodules
//!
//! - [`placeholder`] -- A job that keeps a citizen employed but idle.
//! - [`lumberjack`] -- Finds, fells, and replants trees, and stores the logs
//!   in its hut.

pub mod lumberjack;
pub mod placeholder;

pub use lumberjack::{LumberjackJob, LumberjackState};
pub use placeholder::PlaceholderJob;
