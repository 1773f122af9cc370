//! The outcome record of a single transfer attempt.
//!
//! Every handler operation and every phase of the processor reports a
//! [`TransactionResult`]. A result is built through exactly one of the
//! factory functions; the constructors that need a payload take it by
//! value, so partial and replaced results can never be missing theirs.

/// Which construction mode produced a [`TransactionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResultKind {
    /// The operation was never attempted.
    NotExecuted,
    /// The operation fully succeeded.
    Successful,
    /// The operation succeeded for only part of the requested amount.
    Partial,
    /// Nothing could be transferred.
    Failed,
    /// The operation succeeded by displacing an existing item.
    Replaced,
}

/// Immutable outcome of one transfer attempt.
///
/// Invariants (guaranteed by construction):
/// - failed implies not successful
/// - partial implies successful
/// - replaced implies successful
/// - partial and replaced always carry a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult<T> {
    kind: ResultKind,
    payload: Option<T>,
}

impl<T> TransactionResult<T> {
    /// A result for an operation that was never attempted.
    pub const fn not_executed() -> Self {
        Self {
            kind: ResultKind::NotExecuted,
            payload: None,
        }
    }

    /// A plain successful result without payload.
    pub const fn success() -> Self {
        Self {
            kind: ResultKind::Successful,
            payload: None,
        }
    }

    /// A plain successful result handing over `payload` (for example the
    /// item removed by an extraction).
    pub const fn success_with(payload: T) -> Self {
        Self {
            kind: ResultKind::Successful,
            payload: Some(payload),
        }
    }

    /// A partially successful result. `leftover` is the unaccepted
    /// remainder for insertions, or the smaller-than-requested removed item
    /// for extractions.
    pub const fn partial(leftover: T) -> Self {
        Self {
            kind: ResultKind::Partial,
            payload: Some(leftover),
        }
    }

    /// A failed result.
    pub const fn failed() -> Self {
        Self {
            kind: ResultKind::Failed,
            payload: None,
        }
    }

    /// A successful result that displaced `displaced` from the target.
    pub const fn replaced(displaced: T) -> Self {
        Self {
            kind: ResultKind::Replaced,
            payload: Some(displaced),
        }
    }

    /// The construction mode of this result.
    pub const fn kind(&self) -> ResultKind {
        self.kind
    }

    /// Whether the operation was attempted at all.
    pub const fn is_executed(&self) -> bool {
        !matches!(self.kind, ResultKind::NotExecuted)
    }

    /// Whether the operation succeeded, fully, partially, or by replacement.
    pub const fn is_successful(&self) -> bool {
        matches!(
            self.kind,
            ResultKind::Successful | ResultKind::Partial | ResultKind::Replaced
        )
    }

    /// Whether only part of the amount was transferred.
    pub const fn is_partial(&self) -> bool {
        matches!(self.kind, ResultKind::Partial)
    }

    /// Whether nothing could be transferred.
    pub const fn is_failed(&self) -> bool {
        matches!(self.kind, ResultKind::Failed)
    }

    /// Whether an existing item was displaced.
    pub const fn is_replaced(&self) -> bool {
        matches!(self.kind, ResultKind::Replaced)
    }

    /// Whether the operation fully succeeded with nothing left over and
    /// nothing displaced.
    pub const fn is_complete_success(&self) -> bool {
        matches!(self.kind, ResultKind::Successful)
    }

    /// The leftover, displaced, or handed-over payload, if any.
    pub const fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    /// Consume the result and return its payload, if any.
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_executed_is_neither_success_nor_failure() {
        let result: TransactionResult<u32> = TransactionResult::not_executed();
        assert!(!result.is_executed());
        assert!(!result.is_successful());
        assert!(!result.is_failed());
        assert_eq!(result.payload(), None);
    }

    #[test]
    fn failed_is_never_successful() {
        let result: TransactionResult<u32> = TransactionResult::failed();
        assert!(result.is_executed());
        assert!(result.is_failed());
        assert!(!result.is_successful());
    }

    #[test]
    fn partial_implies_successful_with_payload() {
        let result = TransactionResult::partial(6_u32);
        assert!(result.is_successful());
        assert!(result.is_partial());
        assert!(!result.is_complete_success());
        assert_eq!(result.payload(), Some(&6));
    }

    #[test]
    fn replaced_implies_successful_with_payload() {
        let result = TransactionResult::replaced(3_u32);
        assert!(result.is_successful());
        assert!(result.is_replaced());
        assert!(!result.is_partial());
        assert_eq!(result.into_payload(), Some(3));
    }

    #[test]
    fn success_with_hands_over_payload() {
        let result = TransactionResult::success_with(10_u32);
        assert!(result.is_complete_success());
        assert_eq!(result.kind(), ResultKind::Successful);
        assert_eq!(result.payload(), Some(&10));
    }
}
