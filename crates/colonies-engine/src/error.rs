//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the tick loop.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: colonies_core::ConfigError,
    },

    /// The colony failed to tick or snapshot.
    #[error("colony error: {source}")]
    Colony {
        /// The underlying colony error.
        #[from]
        source: colonies_core::CoreError,
    },

    /// Writing the snapshot file failed.
    #[error("io error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The demo world could not be laid out.
    #[error("world generation error: {message}")]
    Generation {
        /// Description of the failure.
        message: String,
    },
}
