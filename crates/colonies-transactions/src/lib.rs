//! Bi-directional resource transactions for the Colonies simulation.
//!
//! Items move between inventories only through transactions. A transaction
//! pairs an insertion end and an extraction end, each borrowed as a
//! [`Handler`], and is driven by a [`TransactionProcessor`] through a fixed
//! phase machine. A rejected insertion is compensated by putting the payload
//! back into the source; a partial or replacing insertion sends the
//! remainder back through a backwards phase. Nothing is dropped silently:
//! whatever ends up in neither handler is kept as a stranded payload on the
//! transaction and logged.
//!
//! # Modules
//!
//! - [`result`] -- [`TransactionResult`], the outcome of every step
//! - [`handler`] -- Insertion / extraction capability traits and [`Handler`]
//! - [`phase`] -- [`TransactionPhase`] and its transition table
//! - [`transaction`] -- The [`Transaction`] record
//! - [`processor`] -- [`TransactionProcessor`]: forward run and undo
//! - [`callback`] -- Phase-change callbacks
//! - [`inventory`] -- [`SlotInventory`], a slot-based handler for item stacks
//! - [`conservation`] -- Unit-flow summary and conservation audit
//!
//! # Usage
//!
//! ```
//! use colonies_transactions::{NoopCallback, SlotInventory, Transaction, TransactionProcessor};
//! use colonies_types::{ItemKind, ItemStack, TreeVariety};
//!
//! let log = ItemKind::Log(TreeVariety::Oak);
//! let mut source = SlotInventory::new(1);
//! source.set_slot(0, Some(ItemStack::new(log, 10))).ok();
//! let mut target = SlotInventory::new(1);
//!
//! let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 10);
//! let result = TransactionProcessor::new(&mut tx, NoopCallback).execute();
//! assert!(result.is_ok_and(|r| r.is_successful()));
//! drop(tx);
//! assert_eq!(target.count_of(log), 10);
//! ```

pub mod callback;
pub mod conservation;
pub mod handler;
pub mod inventory;
pub mod phase;
pub mod processor;
pub mod result;
pub mod transaction;

// Re-export primary types at crate root.
pub use callback::{FnCallback, NoopCallback, PhaseChangeCallback, PhaseRecorder, TracingCallback};
pub use conservation::{ConservationResult, Quantity, TransferAnomaly, TransferSummary};
pub use handler::{BiDirectionalHandler, ExtractionHandler, Handler, InsertionHandler};
pub use inventory::{InventoryError, SlotInventory};
pub use phase::TransactionPhase;
pub use processor::TransactionProcessor;
pub use result::{ResultKind, TransactionResult};
pub use transaction::Transaction;

/// Errors raised when a transaction is misused.
///
/// Ordinary transfer outcomes (shortfalls, rejections, compensations) are
/// reported as [`TransactionResult`]s, never as errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// The transaction already ran its forward phases.
    #[error("transaction has already been executed")]
    AlreadyExecuted,

    /// Undo was requested before the transaction ran.
    #[error("transaction has not been executed")]
    NotExecuted,

    /// The phase machine does not allow this move.
    #[error("illegal transaction phase transition {from} -> {to}")]
    IllegalTransition {
        /// The current phase.
        from: TransactionPhase,
        /// The requested phase.
        to: TransactionPhase,
    },

    /// At least one end cannot both insert and extract.
    #[error("undo requires both handlers to be bi-directional")]
    UndoUnsupported,

    /// The transaction's outcome cannot be undone.
    #[error("a transaction that ended {outcome} cannot be undone")]
    UndoNotAllowed {
        /// The outcome that was reached.
        outcome: TransactionPhase,
    },

    /// Undo has already been attempted.
    #[error("transaction undo has already been attempted")]
    AlreadyUndone,

    /// A handler end lacks the capability its position requires.
    #[error("{side} handler is {capability}-only")]
    MissingCapability {
        /// Which end of the transaction.
        side: &'static str,
        /// The capability the handler offers instead.
        capability: &'static str,
    },
}
