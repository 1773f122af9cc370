//! Handler capability traits.
//!
//! Any inventory-like object takes part in a transaction by implementing
//! [`InsertionHandler`], [`ExtractionHandler`], or both. Implementing both
//! makes it a [`BiDirectionalHandler`] automatically, which is what undo
//! requires.
//!
//! A [`Transaction`](crate::Transaction) holds its two ends as [`Handler`]
//! values so the processor can ask at runtime which capabilities each end
//! offers.

use crate::result::TransactionResult;

/// An object that accepts incoming transfers of `T`.
pub trait InsertionHandler<T> {
    /// Attempt to place `item` at `index`.
    ///
    /// Returns success when fully accepted, partial with the unaccepted
    /// remainder, replaced with the displaced item, or failed when nothing
    /// could be placed. Only the accepted amount may be mutated.
    fn perform_insertion(&mut self, index: usize, item: T) -> TransactionResult<T>;
}

/// An object that yields outgoing transfers of `T`.
pub trait ExtractionHandler<T> {
    /// Attempt to remove up to `amount` units from `index`.
    ///
    /// Returns success with the removed item when fully satisfied, partial
    /// with the (smaller) removed item, or failed when nothing was
    /// available. Only the removed amount may be mutated.
    fn perform_extraction(&mut self, index: usize, amount: u32) -> TransactionResult<T>;
}

/// An object that can act as both ends of a transaction and therefore
/// supports undo.
///
/// Implemented automatically for every type implementing both
/// [`InsertionHandler`] and [`ExtractionHandler`].
pub trait BiDirectionalHandler<T>: InsertionHandler<T> + ExtractionHandler<T> {}

impl<T, H> BiDirectionalHandler<T> for H where H: InsertionHandler<T> + ExtractionHandler<T> + ?Sized {}

/// A borrowed transaction end, tagged with the capabilities it offers.
pub enum Handler<'a, T> {
    /// Accepts items only.
    Insertion(&'a mut dyn InsertionHandler<T>),
    /// Yields items only.
    Extraction(&'a mut dyn ExtractionHandler<T>),
    /// Accepts and yields items.
    BiDirectional(&'a mut dyn BiDirectionalHandler<T>),
}

impl<'a, T> Handler<'a, T> {
    /// Wrap an insertion-only handler.
    pub fn insertion(handler: &'a mut dyn InsertionHandler<T>) -> Self {
        Self::Insertion(handler)
    }

    /// Wrap an extraction-only handler.
    pub fn extraction(handler: &'a mut dyn ExtractionHandler<T>) -> Self {
        Self::Extraction(handler)
    }

    /// Wrap a handler offering both capabilities.
    pub fn bi_directional(handler: &'a mut dyn BiDirectionalHandler<T>) -> Self {
        Self::BiDirectional(handler)
    }

    /// Whether this end can accept items.
    pub const fn can_insert(&self) -> bool {
        matches!(self, Self::Insertion(_) | Self::BiDirectional(_))
    }

    /// Whether this end can yield items.
    pub const fn can_extract(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::BiDirectional(_))
    }

    /// Whether this end offers both capabilities.
    pub const fn is_bi_directional(&self) -> bool {
        matches!(self, Self::BiDirectional(_))
    }

    /// Insert through this end, or `None` if it cannot accept items.
    pub fn insert(&mut self, index: usize, item: T) -> Option<TransactionResult<T>> {
        match self {
            Self::Insertion(handler) => Some(handler.perform_insertion(index, item)),
            Self::BiDirectional(handler) => Some(handler.perform_insertion(index, item)),
            Self::Extraction(_) => None,
        }
    }

    /// Extract through this end, or `None` if it cannot yield items.
    pub fn extract(&mut self, index: usize, amount: u32) -> Option<TransactionResult<T>> {
        match self {
            Self::Extraction(handler) => Some(handler.perform_extraction(index, amount)),
            Self::BiDirectional(handler) => Some(handler.perform_extraction(index, amount)),
            Self::Insertion(_) => None,
        }
    }

    /// Short capability name used in logs and errors.
    pub const fn capability_name(&self) -> &'static str {
        match self {
            Self::Insertion(_) => "insertion",
            Self::Extraction(_) => "extraction",
            Self::BiDirectional(_) => "bi-directional",
        }
    }
}

impl<T> core::fmt::Debug for Handler<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Handler({})", self.capability_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts units; accepts anything, yields up to what it holds.
    #[derive(Debug, Default)]
    struct Counter {
        held: u32,
    }

    impl InsertionHandler<u32> for Counter {
        fn perform_insertion(&mut self, _index: usize, item: u32) -> TransactionResult<u32> {
            self.held = self.held.saturating_add(item);
            TransactionResult::success()
        }
    }

    impl ExtractionHandler<u32> for Counter {
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

    /// Accepts only.
    struct Sink;

    impl InsertionHandler<u32> for Sink {
        fn perform_insertion(&mut self, _index: usize, _item: u32) -> TransactionResult<u32> {
            TransactionResult::success()
        }
    }

    #[test]
    fn bi_directional_handler_offers_both() {
        let mut counter = Counter { held: 5 };
        {
            let mut handler = Handler::bi_directional(&mut counter);
            assert!(handler.can_insert());
            assert!(handler.can_extract());
            assert!(handler.is_bi_directional());
            assert!(handler.extract(0, 3).is_some_and(|r| r.is_complete_success()));
            assert!(handler.insert(0, 1).is_some_and(|r| r.is_successful()));
        }
        assert_eq!(counter.held, 3);
    }

    #[test]
    fn insertion_only_handler_cannot_extract() {
        let mut sink = Sink;
        let mut handler = Handler::insertion(&mut sink);
        assert!(handler.can_insert());
        assert!(!handler.can_extract());
        assert!(handler.extract(0, 1).is_none());
        assert_eq!(handler.capability_name(), "insertion");
    }

    #[test]
    fn extraction_only_handler_cannot_insert() {
        let mut counter = Counter { held: 1 };
        let mut handler = Handler::extraction(&mut counter);
        assert!(!handler.can_insert());
        assert!(handler.insert(0, 1).is_none());
        assert!(handler.extract(0, 4).is_some_and(|r| r.is_partial()));
    }
}
