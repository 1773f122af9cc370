//! Phase-change notification.
//!
//! The processor calls [`PhaseChangeCallback::on_phase_change`] before every
//! phase change, with the transaction still in its old phase.

use tracing::debug;

use crate::phase::TransactionPhase;
use crate::transaction::Transaction;

/// Receives every phase change of a transaction.
pub trait PhaseChangeCallback<T> {
    /// Called with the old phase, the transaction (still in `old`), and the
    /// phase about to be entered.
    fn on_phase_change(
        &mut self,
        old: TransactionPhase,
        transaction: &Transaction<'_, T>,
        new: TransactionPhase,
    );
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallback;

impl<T> PhaseChangeCallback<T> for NoopCallback {
    fn on_phase_change(&mut self, _old: TransactionPhase, _tx: &Transaction<'_, T>, _new: TransactionPhase) {}
}

/// Emits a `debug!` event per phase change.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCallback;

impl<T> PhaseChangeCallback<T> for TracingCallback {
    fn on_phase_change(
        &mut self,
        old: TransactionPhase,
        transaction: &Transaction<'_, T>,
        new: TransactionPhase,
    ) {
        debug!(
            from = %old,
            to = %new,
            amount = transaction.amount(),
            source = transaction.source_index(),
            target = transaction.target_index(),
            "transaction phase change"
        );
    }
}

/// Collects every `(old, new)` pair in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseRecorder {
    transitions: Vec<(TransactionPhase, TransactionPhase)>,
}

impl PhaseRecorder {
    /// An empty recorder.
    pub const fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// The recorded transitions.
    pub fn transitions(&self) -> &[(TransactionPhase, TransactionPhase)] {
        &self.transitions
    }

    /// The sequence of entered phases, starting with the first `old` phase.
    pub fn phases(&self) -> Vec<TransactionPhase> {
        let mut phases: Vec<TransactionPhase> = self
            .transitions
            .first()
            .map(|(old, _)| *old)
            .into_iter()
            .collect();
        phases.extend(self.transitions.iter().map(|(_, new)| *new));
        phases
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}

impl<T> PhaseChangeCallback<T> for PhaseRecorder {
    fn on_phase_change(&mut self, old: TransactionPhase, _tx: &Transaction<'_, T>, new: TransactionPhase) {
        self.transitions.push((old, new));
    }
}

/// Adapts a closure into a [`PhaseChangeCallback`]. Built with [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnCallback<F>(F);

/// Wrap `f` so it can be passed as a processor callback.
pub const fn from_fn<T, F>(f: F) -> FnCallback<F>
where
    F: FnMut(TransactionPhase, &Transaction<'_, T>, TransactionPhase),
{
    FnCallback(f)
}

impl<T, F> PhaseChangeCallback<T> for FnCallback<F>
where
    F: FnMut(TransactionPhase, &Transaction<'_, T>, TransactionPhase),
{
    fn on_phase_change(
        &mut self,
        old: TransactionPhase,
        transaction: &Transaction<'_, T>,
        new: TransactionPhase,
    ) {
        (self.0)(old, transaction, new);
    }
}
