//! Conservation accounting for a single transaction.
//!
//! Every unit that leaves a handler during a transaction must arrive in a
//! handler, or be recorded as stranded. For a finished run the check is:
//!
//! ```text
//! extracted + displaced + source_displaced == accepted + returned + stranded
//! ```
//!
//! `extracted` leaves the source and `displaced` leaves the target through a
//! replacement. `accepted` enters the target, `returned` goes back to the
//! source through the backwards phase or the compensating rollback, and
//! `source_displaced` is whatever that return pushed out of the source.
//!
//! The [`TransferSummary`] computed here is also what undo uses to know how
//! much to pull back out of each handler.

use crate::phase::TransactionPhase;
use crate::result::{ResultKind, TransactionResult};
use crate::transaction::Transaction;

use colonies_types::ItemStack;

// ---------------------------------------------------------------------------
// Quantity
// ---------------------------------------------------------------------------

/// A payload that carries a countable amount.
pub trait Quantity: Sized {
    /// The number of units carried.
    fn quantity(&self) -> u32;

    /// The same payload carrying a different number of units.
    #[must_use]
    fn with_quantity(&self, quantity: u32) -> Self;
}

impl Quantity for ItemStack {
    fn quantity(&self) -> u32 {
        self.count
    }

    fn with_quantity(&self, quantity: u32) -> Self {
        self.with_count(quantity)
    }
}

impl Quantity for u32 {
    fn quantity(&self) -> u32 {
        *self
    }

    fn with_quantity(&self, quantity: u32) -> Self {
        quantity
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Unit flows of one forward run, derived from the recorded phase results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferSummary {
    /// Units removed from the source by the forwards extraction.
    pub extracted: u32,
    /// Units of the extracted payload now held by the target.
    pub accepted: u32,
    /// Units the target refused (partial insertion).
    pub leftover: u32,
    /// Units displaced out of the target by a replacing insertion.
    pub displaced: u32,
    /// Units put back into the source by the backwards phase or by the
    /// compensating rollback.
    pub returned: u32,
    /// Units displaced out of the source while putting units back.
    pub source_displaced: u32,
    /// Whether `returned` went through the compensating rollback rather
    /// than the backwards phase.
    pub rolled_back: bool,
    /// Units held by neither handler.
    pub stranded: u32,
}

impl TransferSummary {
    /// Units that left a handler.
    pub const fn inflow(&self) -> Option<u32> {
        match self.extracted.checked_add(self.displaced) {
            Some(total) => total.checked_add(self.source_displaced),
            None => None,
        }
    }

    /// Units that arrived in a handler or were recorded as stranded.
    pub const fn outflow(&self) -> Option<u32> {
        match self.accepted.checked_add(self.returned) {
            Some(total) => total.checked_add(self.stranded),
            None => None,
        }
    }

    /// Whether no units moved at all.
    pub const fn is_empty(&self) -> bool {
        self.extracted == 0 && self.displaced == 0
    }
}

fn payload_quantity<T: Quantity>(result: Option<&TransactionResult<T>>) -> u32 {
    result
        .and_then(TransactionResult::payload)
        .map_or(0, Quantity::quantity)
}

/// Derive the unit flows of `transaction` from its recorded results.
///
/// Phases that did not run contribute nothing.
pub fn summarize<T: Quantity>(transaction: &Transaction<'_, T>) -> TransferSummary {
    let stranded = transaction
        .stranded()
        .iter()
        .fold(0_u32, |acc, item| acc.saturating_add(item.quantity()));

    let extraction = transaction.result_for(TransactionPhase::ForwardsExtraction);
    if !extraction.is_some_and(TransactionResult::is_successful) {
        return TransferSummary {
            stranded,
            ..TransferSummary::default()
        };
    }
    let extracted = payload_quantity(extraction);

    let insertion = transaction.result_for(TransactionPhase::ForwardsInsertion);
    let (accepted, leftover, displaced) = match insertion.map(TransactionResult::kind) {
        Some(ResultKind::Successful) => (extracted, 0, 0),
        Some(ResultKind::Partial) => {
            let leftover = payload_quantity(insertion);
            (extracted.saturating_sub(leftover), leftover, 0)
        }
        Some(ResultKind::Replaced) => (extracted, 0, payload_quantity(insertion)),
        Some(ResultKind::Failed | ResultKind::NotExecuted) | None => (0, extracted, 0),
    };

    // Units offered back to the source, and how much of that it took.
    let offered = leftover.saturating_add(displaced);
    let backwards = transaction.result_for(TransactionPhase::Backwards);
    let rollback = transaction.rollback_result();
    let rolled_back = backwards.is_none() && rollback.is_some();
    let (returned, source_displaced) = match backwards.or(rollback).map(TransactionResult::kind) {
        Some(ResultKind::Successful) => (offered, 0),
        Some(ResultKind::Replaced) => (offered, payload_quantity(backwards.or(rollback))),
        Some(ResultKind::Partial) => (
            offered.saturating_sub(payload_quantity(backwards.or(rollback))),
            0,
        ),
        Some(ResultKind::Failed | ResultKind::NotExecuted) | None => (0, 0),
    };

    TransferSummary {
        extracted,
        accepted,
        leftover,
        displaced,
        returned,
        source_displaced,
        rolled_back,
        stranded,
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// A transaction whose unit flows do not balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAnomaly {
    /// Units that left a handler.
    pub inflow: u32,
    /// Units accounted for on arrival.
    pub outflow: u32,
    /// The phase the transaction was in when audited.
    pub phase: TransactionPhase,
}

/// The result of a conservation audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every unit is accounted for.
    Balanced,
    /// Units appeared or vanished.
    Anomaly(TransferAnomaly),
}

/// Check the conservation law for a transaction's forward run.
pub fn audit<T: Quantity>(transaction: &Transaction<'_, T>) -> ConservationResult {
    let summary = summarize(transaction);
    match (summary.inflow(), summary.outflow()) {
        (Some(inflow), Some(outflow)) if inflow == outflow => ConservationResult::Balanced,
        (inflow, outflow) => ConservationResult::Anomaly(TransferAnomaly {
            inflow: inflow.unwrap_or(u32::MAX),
            outflow: outflow.unwrap_or(u32::MAX),
            phase: transaction.phase(),
        }),
    }
}
