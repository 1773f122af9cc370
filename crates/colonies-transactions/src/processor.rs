//! The transaction processor: drives a [`Transaction`] through its phases.
//!
//! # Forward run
//!
//! 1. `SETUP` is announced and recorded as not executed.
//! 2. `FORWARDS_EXTRACTION` removes up to `amount` from the source. On
//!    failure the run fails without touching the target.
//! 3. `FORWARDS_INSERTION` places the payload into the target. A rejection
//!    triggers a compensating rollback into the source. A partial or
//!    replacing insertion continues to `BACKWARDS`.
//! 4. `BACKWARDS` returns the leftover or displaced payload to the source.
//! 5. `SUCCESSFUL` or `FAILED`, then `COMPLETE`.
//!
//! Anything that ends up in neither handler is pushed onto the
//! transaction's stranded list and logged with `error!`.
//!
//! # Undo
//!
//! [`TransactionProcessor::undo`] reverses a completed run when both ends
//! are bi-directional. `FORWARDS_UNDO` pulls the backwards return out of the
//! source again. `BACKWARDS_UNDO` pulls the accepted units out of the
//! target, puts a displaced item back into the target, and returns the
//! recovered units (and any stranded payload) to the source.

use tracing::{error, warn};

use crate::TransactionError;
use crate::callback::PhaseChangeCallback;
use crate::conservation::{self, Quantity, TransferSummary};
use crate::handler::Handler;
use crate::phase::TransactionPhase;
use crate::result::TransactionResult;
use crate::transaction::Transaction;

/// What the forwards insertion left to do.
enum InsertionStep<T> {
    /// Fully accepted.
    Done,
    /// Rejected and compensated (or stranded).
    Rejected,
    /// Partially accepted or replacing; the payload goes back to the source.
    Backwards(T),
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Drives one transaction and reports every phase change to a callback.
pub struct TransactionProcessor<'t, 'a, T, C> {
    transaction: &'t mut Transaction<'a, T>,
    callback: C,
}

impl<'t, 'a, T, C> TransactionProcessor<'t, 'a, T, C>
where
    T: Clone + core::fmt::Debug,
    C: PhaseChangeCallback<T>,
{
    /// Create a processor for `transaction`.
    pub const fn new(transaction: &'t mut Transaction<'a, T>, callback: C) -> Self {
        Self {
            transaction,
            callback,
        }
    }

    /// The transaction being driven.
    pub fn transaction(&self) -> &Transaction<'a, T> {
        &*self.transaction
    }

    /// The callback receiving phase changes.
    pub const fn callback(&self) -> &C {
        &self.callback
    }

    /// Release the processor and return its callback.
    pub fn into_callback(self) -> C {
        self.callback
    }

    /// Run the forward transfer to completion.
    ///
    /// Returns the final result: success when the run ended `SUCCESSFUL`
    /// (even if the backwards return was incomplete), failed otherwise.
    /// Per-phase results stay available on the transaction.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::AlreadyExecuted`] if the transaction has run.
    /// - [`TransactionError::IllegalTransition`] if the phase machine is
    ///   asked for a move its table forbids.
    pub fn execute(&mut self) -> Result<TransactionResult<T>, TransactionError> {
        if self.transaction.is_executed() {
            return Err(TransactionError::AlreadyExecuted);
        }

        self.transition(TransactionPhase::Setup)?;
        self.transaction
            .record(TransactionPhase::Setup, TransactionResult::not_executed());

        let outcome = match self.perform_forwards_extraction()? {
            None => TransactionPhase::Failed,
            Some(payload) => match self.perform_forwards_insertion(payload)? {
                InsertionStep::Done => TransactionPhase::Successful,
                InsertionStep::Rejected => TransactionPhase::Failed,
                InsertionStep::Backwards(rest) => {
                    if self.perform_backwards(rest)? {
                        TransactionPhase::Successful
                    } else {
                        TransactionPhase::Failed
                    }
                }
            },
        };
        self.finish(outcome)
    }

    fn transition(&mut self, new: TransactionPhase) -> Result<(), TransactionError> {
        let old = self.transaction.phase;
        if !old.can_transition_to(new) {
            return Err(TransactionError::IllegalTransition { from: old, to: new });
        }
        self.callback.on_phase_change(old, &*self.transaction, new);
        self.transaction.phase = new;
        Ok(())
    }

    fn finish(&mut self, outcome: TransactionPhase) -> Result<TransactionResult<T>, TransactionError> {
        self.transition(outcome)?;
        self.transaction.record(outcome, final_result(outcome));
        self.transaction.outcome = Some(outcome);
        self.transition(TransactionPhase::Complete)?;
        Ok(final_result(outcome))
    }

    fn perform_forwards_extraction(&mut self) -> Result<Option<T>, TransactionError> {
        self.transition(TransactionPhase::ForwardsExtraction)?;
        let tx = &mut *self.transaction;

        let result = tx
            .extraction
            .extract(tx.from, tx.amount)
            .unwrap_or_else(TransactionResult::failed);
        if !result.is_successful() {
            tx.record(TransactionPhase::ForwardsExtraction, TransactionResult::failed());
            return Ok(None);
        }
        let Some(payload) = result.payload().cloned() else {
            warn!(
                source = tx.from,
                amount = tx.amount,
                "extraction reported success without handing over a payload"
            );
            tx.record(TransactionPhase::ForwardsExtraction, TransactionResult::failed());
            return Ok(None);
        };

        tx.original = Some(payload.clone());
        tx.record(TransactionPhase::ForwardsExtraction, result);
        Ok(Some(payload))
    }

    fn perform_forwards_insertion(&mut self, payload: T) -> Result<InsertionStep<T>, TransactionError> {
        self.transition(TransactionPhase::ForwardsInsertion)?;
        let tx = &mut *self.transaction;

        let result = tx
            .insertion
            .insert(tx.into, payload.clone())
            .unwrap_or_else(TransactionResult::failed);
        if !result.is_successful() {
            tx.record(TransactionPhase::ForwardsInsertion, TransactionResult::failed());
            self.compensate(payload);
            return Ok(InsertionStep::Rejected);
        }

        let step = match result.payload() {
            Some(rest) if result.is_partial() || result.is_replaced() => {
                InsertionStep::Backwards(rest.clone())
            }
            _ => InsertionStep::Done,
        };
        tx.record(TransactionPhase::ForwardsInsertion, result);
        Ok(step)
    }

    /// Put a rejected payload back where it came from.
    fn compensate(&mut self, payload: T) {
        let tx = &mut *self.transaction;
        match tx.extraction.insert(tx.from, payload.clone()) {
            Some(result) if result.is_complete_success() => {
                tx.rollback = Some(result);
            }
            Some(result) if result.is_successful() => {
                error!(
                    source = tx.from,
                    remainder = ?result.payload(),
                    "failed to undo a transaction: rollback into the source only completed partially"
                );
                if let Some(rest) = result.payload().cloned() {
                    tx.strand(rest);
                }
                tx.rollback = Some(result);
            }
            other => {
                error!(
                    source = tx.from,
                    payload = ?payload,
                    "failed to undo a transaction: rollback into the source was refused"
                );
                tx.strand(payload);
                tx.rollback = Some(other.unwrap_or_else(TransactionResult::failed));
            }
        }
    }

    fn perform_backwards(&mut self, rest: T) -> Result<bool, TransactionError> {
        self.transition(TransactionPhase::Backwards)?;
        let tx = &mut *self.transaction;

        match tx.extraction.insert(tx.from, rest.clone()) {
            Some(result) if result.is_complete_success() => {
                tx.record(TransactionPhase::Backwards, result);
                Ok(true)
            }
            Some(result) if result.is_successful() => {
                warn!(
                    source = tx.from,
                    unreturned = ?result.payload(),
                    "a backwards insertion only completed partially"
                );
                if let Some(unreturned) = result.payload().cloned() {
                    tx.strand(unreturned);
                }
                tx.record(TransactionPhase::Backwards, result);
                Ok(true)
            }
            _ => {
                error!(
                    source = tx.from,
                    payload = ?rest,
                    "backwards insertion failed, payload stranded"
                );
                tx.strand(rest);
                tx.record(TransactionPhase::Backwards, TransactionResult::failed());
                Ok(false)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Undo
// ---------------------------------------------------------------------------

impl<T, C> TransactionProcessor<'_, '_, T, C>
where
    T: Clone + core::fmt::Debug + Quantity,
    C: PhaseChangeCallback<T>,
{
    /// Reverse a completed run.
    ///
    /// Returns success when both handlers were restored, failed when an
    /// undo step could not complete or a payload is left stranded (the
    /// transaction then ends `FAILED`).
    ///
    /// # Errors
    ///
    /// - [`TransactionError::UndoUnsupported`] unless both ends are
    ///   bi-directional. No phase change happens in that case.
    /// - [`TransactionError::NotExecuted`] before [`execute`](Self::execute).
    /// - [`TransactionError::AlreadyUndone`] on a second attempt.
    pub fn undo(&mut self) -> Result<TransactionResult<T>, TransactionError> {
        let tx = &*self.transaction;
        if !tx.supports_undo() {
            return Err(TransactionError::UndoUnsupported);
        }
        if tx.result_for(TransactionPhase::PreprocessingUndo).is_some() {
            return Err(TransactionError::AlreadyUndone);
        }
        match tx.outcome() {
            None => return Err(TransactionError::NotExecuted),
            Some(TransactionPhase::Successful | TransactionPhase::Failed) => {}
            Some(outcome) => return Err(TransactionError::UndoNotAllowed { outcome }),
        }
        let summary = conservation::summarize(tx);

        self.transition(TransactionPhase::PreprocessingUndo)?;
        self.transaction.record(
            TransactionPhase::PreprocessingUndo,
            TransactionResult::not_executed(),
        );

        let backwards_returned = if summary.rolled_back { 0 } else { summary.returned };
        let mut recovered = None;
        if backwards_returned > 0 {
            self.transition(TransactionPhase::ForwardsUndo)?;
            match self.undo_backwards_return(backwards_returned) {
                Some(item) => recovered = Some(item),
                None => return self.fail_undo(TransactionPhase::ForwardsUndo),
            }
        }

        if summary.accepted > 0 || recovered.is_some() || !self.transaction.stranded.is_empty() {
            self.transition(TransactionPhase::BackwardsUndo)?;
            if !self.undo_forward_transfer(&summary, recovered) {
                return self.fail_undo(TransactionPhase::BackwardsUndo);
            }
        }

        self.transition(TransactionPhase::Undone)?;
        self.transaction
            .record(TransactionPhase::Undone, TransactionResult::success());
        self.transaction.outcome = Some(TransactionPhase::Undone);
        self.transition(TransactionPhase::Complete)?;
        Ok(TransactionResult::success())
    }

    /// Pull the units the backwards phase returned out of the source again.
    fn undo_backwards_return(&mut self, quantity: u32) -> Option<T> {
        let tx = &mut *self.transaction;
        match take_exact(&mut tx.extraction, tx.from, quantity) {
            Ok(item) => {
                tx.record(
                    TransactionPhase::ForwardsUndo,
                    TransactionResult::success_with(item.clone()),
                );
                Some(item)
            }
            Err(partial) => {
                if let Some(item) = partial {
                    if let Err(rest) = place(&mut tx.extraction, tx.from, item) {
                        tx.strand(rest);
                    }
                }
                tx.record(TransactionPhase::ForwardsUndo, TransactionResult::failed());
                None
            }
        }
    }

    /// Move the accepted units back from the target to the source.
    fn undo_forward_transfer(&mut self, summary: &TransferSummary, recovered: Option<T>) -> bool {
        let tx = &mut *self.transaction;
        let mut restored = true;
        let mut to_source: Vec<T> = Vec::new();

        if summary.accepted > 0 {
            match take_exact(&mut tx.insertion, tx.into, summary.accepted) {
                Ok(item) => to_source.push(item),
                Err(partial) => {
                    restored = false;
                    if let Some(item) = partial {
                        if let Err(rest) = place(&mut tx.insertion, tx.into, item) {
                            tx.strand(rest);
                        }
                    }
                }
            }
        }

        let mut to_target: Vec<T> = Vec::new();
        if let Some(item) = recovered {
            if summary.displaced > 0 {
                to_target.push(item);
            } else {
                to_source.push(item);
            }
        }
        if restored && summary.displaced > 0 {
            // Units of the displaced item the backwards phase never returned.
            let returned = to_target
                .iter()
                .fold(0_u32, |acc, item| acc.saturating_add(item.quantity()));
            let missing = summary.displaced.saturating_sub(returned);
            to_target.extend(reclaim_stranded(&mut tx.stranded, missing));
        }

        for item in to_target {
            if restored {
                if let Err(rest) = place(&mut tx.insertion, tx.into, item) {
                    restored = false;
                    to_source.push(rest);
                }
            } else {
                to_source.push(item);
            }
        }

        for item in to_source {
            if let Err(rest) = place(&mut tx.extraction, tx.from, item) {
                restored = false;
                tx.strand(rest);
            }
        }

        if restored {
            for item in tx.take_stranded() {
                if let Err(rest) = place(&mut tx.extraction, tx.from, item) {
                    warn!(
                        source = tx.from,
                        payload = ?rest,
                        "stranded payload could not be returned to the source"
                    );
                    restored = false;
                    tx.strand(rest);
                }
            }
        }

        let result = if restored {
            TransactionResult::success()
        } else {
            TransactionResult::failed()
        };
        tx.record(TransactionPhase::BackwardsUndo, result);
        restored
    }

    fn fail_undo(&mut self, phase: TransactionPhase) -> Result<TransactionResult<T>, TransactionError> {
        error!(
            %phase,
            stranded = self.transaction.stranded.len(),
            "failed to undo a transaction"
        );
        self.transition(TransactionPhase::Failed)?;
        // A failed forward run keeps its own entry.
        if self.transaction.result_for(TransactionPhase::Failed).is_none() {
            self.transaction
                .record(TransactionPhase::Failed, TransactionResult::failed());
        }
        self.transaction.outcome = Some(TransactionPhase::Failed);
        self.transition(TransactionPhase::Complete)?;
        Ok(TransactionResult::failed())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const fn final_result<T>(outcome: TransactionPhase) -> TransactionResult<T> {
    match outcome {
        TransactionPhase::Successful | TransactionPhase::Undone => TransactionResult::success(),
        _ => TransactionResult::failed(),
    }
}

/// Insert `item` and require a full, non-displacing success. Whatever is
/// left in hand is returned as the error.
fn place<T: Clone>(handler: &mut Handler<'_, T>, index: usize, item: T) -> Result<(), T> {
    match handler.insert(index, item.clone()) {
        Some(result) if result.is_complete_success() => Ok(()),
        Some(result) if result.is_successful() => Err(result.into_payload().unwrap_or(item)),
        _ => Err(item),
    }
}

/// Extract exactly `quantity` units. A shortfall hands back what was taken.
fn take_exact<T: Quantity>(handler: &mut Handler<'_, T>, index: usize, quantity: u32) -> Result<T, Option<T>> {
    match handler.extract(index, quantity) {
        Some(result) if result.is_complete_success() => match result.into_payload() {
            Some(item) if item.quantity() == quantity => Ok(item),
            other => Err(other),
        },
        Some(result) if result.is_successful() => Err(result.into_payload()),
        _ => Err(None),
    }
}

/// Take up to `quantity` units off the front of `stranded`, splitting a
/// payload that holds more than needed.
fn reclaim_stranded<T: Quantity>(stranded: &mut Vec<T>, mut quantity: u32) -> Vec<T> {
    let mut reclaimed = Vec::new();
    while quantity > 0 && !stranded.is_empty() {
        let item = stranded.remove(0);
        let held = item.quantity();
        if held > quantity {
            stranded.insert(0, item.with_quantity(held.saturating_sub(quantity)));
            reclaimed.push(item.with_quantity(quantity));
            quantity = 0;
        } else {
            quantity = quantity.saturating_sub(held);
            reclaimed.push(item);
        }
    }
    reclaimed
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::callback::{NoopCallback, PhaseRecorder};
    use crate::handler::{ExtractionHandler, InsertionHandler};

    /// A single-slot counter limited to `capacity` units.
    #[derive(Debug)]
    struct Bin {
        held: u32,
        capacity: u32,
    }

    impl InsertionHandler<u32> for Bin {
        fn perform_insertion(&mut self, _index: usize, item: u32) -> TransactionResult<u32> {
            let room = self.capacity.saturating_sub(self.held);
            if room == 0 {
                return TransactionResult::failed();
            }
            let accepted = item.min(room);
            self.held = self.held.saturating_add(accepted);
            if accepted < item {
                TransactionResult::partial(item.saturating_sub(accepted))
            } else {
                TransactionResult::success()
            }
        }
    }

    impl ExtractionHandler<u32> for Bin {
        fn perform_extraction(&mut self, _index: usize, amount: u32) -> TransactionResult<u32> {
            let taken = amount.min(self.held);
            self.held = self.held.saturating_sub(taken);
            if taken == 0 {
                TransactionResult::failed()
            } else if taken < amount {
                TransactionResult::partial(taken)
            } else {
                TransactionResult::success_with(taken)
            }
        }
    }

    /// Yields without limit but refuses everything put into it.
    struct Spring;

    impl ExtractionHandler<u32> for Spring {
        fn perform_extraction(&mut self, _index: usize, amount: u32) -> TransactionResult<u32> {
            TransactionResult::success_with(amount)
        }
    }

    /// Takes everything it is given and never lets go of it.
    #[derive(Debug, Default)]
    struct Locker {
        held: u32,
    }

    impl InsertionHandler<u32> for Locker {
        fn perform_insertion(&mut self, _index: usize, item: u32) -> TransactionResult<u32> {
            self.held = self.held.saturating_add(item);
            TransactionResult::success()
        }
    }

    impl ExtractionHandler<u32> for Locker {
        fn perform_extraction(&mut self, _index: usize, _amount: u32) -> TransactionResult<u32> {
            TransactionResult::failed()
        }
    }

    /// A [`Bin`] that refuses the insertions whose call number is listed.
    #[derive(Debug)]
    struct Moody {
        bin: Bin,
        calls: u32,
        refuse: &'static [u32],
    }

    impl InsertionHandler<u32> for Moody {
        fn perform_insertion(&mut self, index: usize, item: u32) -> TransactionResult<u32> {
            let call = self.calls;
            self.calls = call.saturating_add(1);
            if self.refuse.contains(&call) {
                return TransactionResult::failed();
            }
            self.bin.perform_insertion(index, item)
        }
    }

    impl ExtractionHandler<u32> for Moody {
        fn perform_extraction(&mut self, index: usize, amount: u32) -> TransactionResult<u32> {
            self.bin.perform_extraction(index, amount)
        }
    }

    const fn bin(held: u32, capacity: u32) -> Bin {
        Bin { held, capacity }
    }

    #[test]
    fn full_transfer_succeeds() {
        let mut source = bin(10, 64);
        let mut target = bin(0, 64);
        {
            let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 10);
            let mut processor = TransactionProcessor::new(&mut tx, PhaseRecorder::new());
            let result = processor.execute().unwrap();
            assert!(result.is_complete_success());
            assert_eq!(
                processor.callback().phases(),
                vec![
                    TransactionPhase::Setup,
                    TransactionPhase::Setup,
                    TransactionPhase::ForwardsExtraction,
                    TransactionPhase::ForwardsInsertion,
                    TransactionPhase::Successful,
                    TransactionPhase::Complete,
                ]
            );
            assert_eq!(processor.transaction().outcome(), Some(TransactionPhase::Successful));
        }
        assert_eq!(source.held, 0);
        assert_eq!(target.held, 10);
    }

    #[test]
    fn executing_twice_is_rejected() {
        let mut source = bin(1, 64);
        let mut target = bin(0, 64);
        let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 1);
        let mut processor = TransactionProcessor::new(&mut tx, NoopCallback);
        assert!(processor.execute().is_ok());
        assert!(matches!(
            processor.execute(),
            Err(TransactionError::AlreadyExecuted)
        ));
    }

    #[test]
    fn callback_sees_old_phase_on_transaction() {
        let mut source = bin(3, 64);
        let mut target = bin(0, 64);
        let mut seen = Vec::new();
        {
            let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 3);
            let callback = crate::callback::from_fn::<u32, _>(|old, tx, _new| {
                seen.push(old == tx.phase());
            });
            let mut processor = TransactionProcessor::new(&mut tx, callback);
            assert!(processor.execute().is_ok());
        }
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|matched| *matched));
    }

    #[test]
    fn rejected_insertion_rolls_back() {
        let mut source = bin(5, 64);
        let mut target = bin(64, 64);
        {
            let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 5);
            let mut processor = TransactionProcessor::new(&mut tx, NoopCallback);
            let result = processor.execute().unwrap();
            assert!(result.is_failed());
            let tx = processor.transaction();
            assert!(tx.stranded().is_empty());
            assert!(tx.rollback_result().is_some_and(TransactionResult::is_complete_success));
        }
        assert_eq!(source.held, 5);
        assert_eq!(target.held, 64);
    }

    #[test]
    fn rollback_into_extract_only_source_strands_payload() {
        let mut spring = Spring;
        let mut target = bin(64, 64);
        let mut tx = Transaction::new(
            Handler::bi_directional(&mut target),
            0,
            Handler::extraction(&mut spring),
            0,
            4,
        )
        .unwrap();
        {
            let mut processor = TransactionProcessor::new(&mut tx, NoopCallback);
            assert!(processor.execute().unwrap().is_failed());
        }
        assert_eq!(tx.stranded(), &[4]);
        assert_eq!(tx.take_stranded(), vec![4]);
    }

    #[test]
    fn undo_requires_bi_directional_ends() {
        let mut spring = Spring;
        let mut target = bin(0, 64);
        let mut tx = Transaction::new(
            Handler::bi_directional(&mut target),
            0,
            Handler::extraction(&mut spring),
            0,
            4,
        )
        .unwrap();
        {
            let mut processor = TransactionProcessor::new(&mut tx, PhaseRecorder::new());
            assert!(processor.execute().is_ok());
        }
        let before = tx.phase();
        let mut processor = TransactionProcessor::new(&mut tx, NoopCallback);
        assert!(matches!(
            processor.undo(),
            Err(TransactionError::UndoUnsupported)
        ));
        assert_eq!(processor.transaction().phase(), before);
    }

    #[test]
    fn undo_before_execute_is_rejected() {
        let mut source = bin(1, 64);
        let mut target = bin(0, 64);
        let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 1);
        let mut processor = TransactionProcessor::new(&mut tx, NoopCallback);
        assert!(matches!(processor.undo(), Err(TransactionError::NotExecuted)));
    }

    #[test]
    fn undo_restores_partial_transfer_once() {
        let mut source = bin(10, 64);
        let mut target = bin(60, 64);
        {
            let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 10);
            let mut processor = TransactionProcessor::new(&mut tx, PhaseRecorder::new());
            assert!(processor.execute().unwrap().is_complete_success());
            assert!(processor.undo().unwrap().is_complete_success());
            assert!(matches!(processor.undo(), Err(TransactionError::AlreadyUndone)));
            let phases = processor.callback().phases();
            assert_eq!(
                phases.get(phases.len().saturating_sub(5)..),
                Some(
                    &[
                        TransactionPhase::PreprocessingUndo,
                        TransactionPhase::ForwardsUndo,
                        TransactionPhase::BackwardsUndo,
                        TransactionPhase::Undone,
                        TransactionPhase::Complete,
                    ][..]
                )
            );
            assert_eq!(processor.transaction().outcome(), Some(TransactionPhase::Undone));
        }
        assert_eq!(source.held, 10);
        assert_eq!(target.held, 60);
    }

    #[test]
    fn undo_fails_when_the_target_keeps_the_units() {
        let mut source = bin(10, 64);
        let mut target = Locker::default();
        {
            let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 10);
            let mut processor = TransactionProcessor::new(&mut tx, PhaseRecorder::new());
            assert!(processor.execute().unwrap().is_complete_success());

            let result = processor.undo().unwrap();
            assert!(result.is_failed());
            assert!(matches!(processor.undo(), Err(TransactionError::AlreadyUndone)));

            let phases = processor.callback().phases();
            assert_eq!(
                phases.get(phases.len().saturating_sub(4)..),
                Some(
                    &[
                        TransactionPhase::PreprocessingUndo,
                        TransactionPhase::BackwardsUndo,
                        TransactionPhase::Failed,
                        TransactionPhase::Complete,
                    ][..]
                )
            );

            let tx = processor.transaction();
            assert_eq!(tx.outcome(), Some(TransactionPhase::Failed));
            assert_eq!(tx.phase(), TransactionPhase::Complete);
            assert!(tx.stranded().is_empty());
            assert!(tx
                .result_for(TransactionPhase::BackwardsUndo)
                .is_some_and(TransactionResult::is_failed));
            assert!(tx.result_for(TransactionPhase::Undone).is_none());
        }
        assert_eq!(source.held, 0);
        assert_eq!(target.held, 10);
    }

    #[test]
    fn failed_undo_keeps_the_forward_outcome_entry() {
        let mut source = bin(4, 64);
        let mut target = Locker::default();
        let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 4);
        {
            let mut processor = TransactionProcessor::new(&mut tx, NoopCallback);
            assert!(processor.execute().unwrap().is_complete_success());
            assert!(processor.undo().unwrap().is_failed());
        }
        assert!(tx
            .result_for(TransactionPhase::Successful)
            .is_some_and(TransactionResult::is_complete_success));
        assert!(tx
            .result_for(TransactionPhase::Failed)
            .is_some_and(TransactionResult::is_failed));
        assert!(tx
            .result_for(TransactionPhase::ForwardsInsertion)
            .is_some_and(TransactionResult::is_complete_success));
    }

    #[test]
    fn reclaiming_stranded_splits_the_last_payload() {
        let mut stranded = vec![3_u32, 5];
        assert_eq!(reclaim_stranded(&mut stranded, 6), vec![3, 3]);
        assert_eq!(stranded, vec![2]);
        assert!(reclaim_stranded(&mut stranded, 0).is_empty());
        assert_eq!(reclaim_stranded(&mut stranded, 9), vec![2]);
        assert!(stranded.is_empty());
    }

    #[test]
    fn undo_fails_when_a_stranded_payload_cannot_go_home() {
        // The backwards return and the last undo insertion are refused.
        let mut source = Moody {
            bin: bin(10, 10),
            calls: 0,
            refuse: &[0, 2],
        };
        let mut target = bin(0, 4);
        {
            let mut tx = Transaction::between(&mut target, 0, &mut source, 0, 10);
            let mut processor = TransactionProcessor::new(&mut tx, NoopCallback);
            assert!(processor.execute().unwrap().is_failed());
            assert_eq!(processor.transaction().stranded(), &[6]);

            assert!(processor.undo().unwrap().is_failed());
            let tx = processor.transaction();
            assert_eq!(tx.outcome(), Some(TransactionPhase::Failed));
            assert_eq!(tx.stranded(), &[6]);
            assert!(tx
                .result_for(TransactionPhase::BackwardsUndo)
                .is_some_and(TransactionResult::is_failed));
            assert!(tx
                .result_for(TransactionPhase::Failed)
                .is_some_and(TransactionResult::is_failed));
        }
        assert_eq!(source.bin.held, 4);
        assert_eq!(target.held, 0);
    }
}
