//! The transaction phase state machine.
//!
//! A transaction moves through these phases under the control of a
//! [`TransactionProcessor`](crate::TransactionProcessor). The legal
//! transitions are:
//!
//! | From | To |
//! |------|----|
//! | Setup | Setup, ForwardsExtraction |
//! | ForwardsExtraction | ForwardsInsertion, Failed |
//! | ForwardsInsertion | Backwards, Successful, Failed |
//! | Backwards | Successful, Failed |
//! | Successful, Failed | Complete |
//! | Complete | PreprocessingUndo |
//! | PreprocessingUndo | ForwardsUndo, BackwardsUndo, Undone |
//! | ForwardsUndo | BackwardsUndo, Failed |
//! | BackwardsUndo | Undone, Failed |
//! | Undone | Complete |
//!
//! `Setup -> Setup` is the initial notification sent before any work.

use serde::{Deserialize, Serialize};

/// A stage of a transaction's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionPhase {
    /// Initial state before any handler is touched.
    Setup,
    /// Removing the requested amount from the source.
    ForwardsExtraction,
    /// Placing the extracted payload into the target.
    ForwardsInsertion,
    /// Returning a leftover or displaced payload to the source.
    Backwards,
    /// The transfer succeeded.
    Successful,
    /// The transfer failed.
    Failed,
    /// Validating that an undo can run.
    PreprocessingUndo,
    /// Reversing the backwards step.
    ForwardsUndo,
    /// Reversing the forward transfer. Always runs during an undo that
    /// has anything to restore.
    BackwardsUndo,
    /// The transaction was reversed.
    Undone,
    /// Terminal phase; every run ends here.
    Complete,
}

impl TransactionPhase {
    /// Whether the state machine may move from `self` to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Setup, Self::Setup | Self::ForwardsExtraction)
                | (Self::ForwardsExtraction, Self::ForwardsInsertion | Self::Failed)
                | (
                    Self::ForwardsInsertion,
                    Self::Backwards | Self::Successful | Self::Failed
                )
                | (Self::Backwards, Self::Successful | Self::Failed)
                | (Self::Successful | Self::Failed | Self::Undone, Self::Complete)
                | (Self::Complete, Self::PreprocessingUndo)
                | (
                    Self::PreprocessingUndo,
                    Self::ForwardsUndo | Self::BackwardsUndo | Self::Undone
                )
                | (Self::ForwardsUndo, Self::BackwardsUndo | Self::Failed)
                | (Self::BackwardsUndo, Self::Undone | Self::Failed)
        )
    }

    /// Whether this phase is a terminal outcome of a run.
    pub const fn is_outcome(self) -> bool {
        matches!(self, Self::Successful | Self::Failed | Self::Undone)
    }

    /// Whether this phase belongs to the undo path.
    pub const fn is_undo(self) -> bool {
        matches!(
            self,
            Self::PreprocessingUndo | Self::ForwardsUndo | Self::BackwardsUndo | Self::Undone
        )
    }
}

impl core::fmt::Display for TransactionPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Setup => "SETUP",
            Self::ForwardsExtraction => "FORWARDS_EXTRACTION",
            Self::ForwardsInsertion => "FORWARDS_INSERTION",
            Self::Backwards => "BACKWARDS",
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
            Self::PreprocessingUndo => "PREPROCESSING_UNDO",
            Self::ForwardsUndo => "FORWARDS_UNDO",
            Self::BackwardsUndo => "BACKWARDS_UNDO",
            Self::Undone => "UNDONE",
            Self::Complete => "COMPLETE",
        };
        f.write_str(name)
    }
}
