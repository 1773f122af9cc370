//! The transaction record: two handler ends, an amount, and the results of
//! every phase that has run.
//!
//! A [`Transaction`] is inert on its own. It is driven by a
//! [`TransactionProcessor`](crate::TransactionProcessor), which is the only
//! code allowed to advance its phase or record results.

use std::collections::BTreeMap;

use crate::TransactionError;
use crate::handler::{BiDirectionalHandler, Handler};
use crate::phase::TransactionPhase;
use crate::result::TransactionResult;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A request to move `amount` units from slot `from` of the extraction
/// handler into slot `into` of the insertion handler.
pub struct Transaction<'a, T> {
    pub(crate) insertion: Handler<'a, T>,
    pub(crate) into: usize,
    pub(crate) extraction: Handler<'a, T>,
    pub(crate) from: usize,
    pub(crate) amount: u32,
    pub(crate) phase: TransactionPhase,
    pub(crate) original: Option<T>,
    pub(crate) results: BTreeMap<TransactionPhase, TransactionResult<T>>,
    pub(crate) outcome: Option<TransactionPhase>,
    pub(crate) rollback: Option<TransactionResult<T>>,
    pub(crate) stranded: Vec<T>,
}

impl<'a, T> Transaction<'a, T> {
    /// Create a transaction between two handler ends.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::MissingCapability`] if `insertion` cannot
    /// accept items or `extraction` cannot yield them.
    pub fn new(
        insertion: Handler<'a, T>,
        into: usize,
        extraction: Handler<'a, T>,
        from: usize,
        amount: u32,
    ) -> Result<Self, TransactionError> {
        if !insertion.can_insert() {
            return Err(TransactionError::MissingCapability {
                side: "insertion",
                capability: insertion.capability_name(),
            });
        }
        if !extraction.can_extract() {
            return Err(TransactionError::MissingCapability {
                side: "extraction",
                capability: extraction.capability_name(),
            });
        }
        Ok(Self::unchecked(insertion, into, extraction, from, amount))
    }

    /// Create a transaction between two bi-directional handlers. Such a
    /// transaction always supports undo.
    pub fn between(
        target: &'a mut dyn BiDirectionalHandler<T>,
        into: usize,
        source: &'a mut dyn BiDirectionalHandler<T>,
        from: usize,
        amount: u32,
    ) -> Self {
        Self::unchecked(
            Handler::bi_directional(target),
            into,
            Handler::bi_directional(source),
            from,
            amount,
        )
    }

    const fn unchecked(
        insertion: Handler<'a, T>,
        into: usize,
        extraction: Handler<'a, T>,
        from: usize,
        amount: u32,
    ) -> Self {
        Self {
            insertion,
            into,
            extraction,
            from,
            amount,
            phase: TransactionPhase::Setup,
            original: None,
            results: BTreeMap::new(),
            outcome: None,
            rollback: None,
            stranded: Vec::new(),
        }
    }

    /// The current phase.
    pub const fn phase(&self) -> TransactionPhase {
        self.phase
    }

    /// The slot index items are inserted into.
    pub const fn target_index(&self) -> usize {
        self.into
    }

    /// The slot index items are extracted from.
    pub const fn source_index(&self) -> usize {
        self.from
    }

    /// The requested amount.
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// The payload removed by the forwards extraction, once it has run.
    pub const fn original(&self) -> Option<&T> {
        self.original.as_ref()
    }

    /// The result recorded for `phase`, if that phase has run.
    pub fn result_for(&self, phase: TransactionPhase) -> Option<&TransactionResult<T>> {
        self.results.get(&phase)
    }

    /// Every recorded result, in phase order.
    pub const fn results(&self) -> &BTreeMap<TransactionPhase, TransactionResult<T>> {
        &self.results
    }

    /// The terminal outcome (`Successful`, `Failed` or `Undone`) of the last
    /// run, if any run has finished.
    pub const fn outcome(&self) -> Option<TransactionPhase> {
        self.outcome
    }

    /// The result of the compensating rollback into the source, if a
    /// rejected insertion triggered one.
    pub const fn rollback_result(&self) -> Option<&TransactionResult<T>> {
        self.rollback.as_ref()
    }

    /// Whether the forward run has been executed.
    pub fn is_executed(&self) -> bool {
        !self.results.is_empty()
    }

    /// Payloads that neither handler holds after a failed compensation or
    /// an incomplete backwards insertion.
    pub fn stranded(&self) -> &[T] {
        &self.stranded
    }

    /// Take ownership of the stranded payloads, leaving none behind.
    pub fn take_stranded(&mut self) -> Vec<T> {
        std::mem::take(&mut self.stranded)
    }

    /// Whether both ends can accept and yield items, which undo requires.
    pub const fn supports_undo(&self) -> bool {
        self.insertion.is_bi_directional() && self.extraction.is_bi_directional()
    }

    pub(crate) fn record(&mut self, phase: TransactionPhase, result: TransactionResult<T>) {
        self.results.insert(phase, result);
    }

    pub(crate) fn strand(&mut self, payload: T) {
        self.stranded.push(payload);
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Transaction<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transaction")
            .field("insertion", &self.insertion)
            .field("into", &self.into)
            .field("extraction", &self.extraction)
            .field("from", &self.from)
            .field("amount", &self.amount)
            .field("phase", &self.phase)
            .field("original", &self.original)
            .field("results", &self.results)
            .field("outcome", &self.outcome)
            .field("rollback", &self.rollback)
            .field("stranded", &self.stranded)
            .finish()
    }
}
