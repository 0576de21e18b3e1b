//! Detached, version-checked forward cursor over a stock's slots.
//!
//! `Stock::iter` borrows the stock, so the borrow checker already rules out mutation
//! while it runs. A [`StockCursor`] holds no borrow between steps; it remembers the
//! structural version it was created at and refuses to continue once that changes.

use stackledger_core::{Entry, ExpectedVersion, Item, SlotSequence, StockResult, Versioned};

use crate::stock::Stock;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockCursor {
    position: usize,
    expected: ExpectedVersion,
}

impl StockCursor {
    pub(crate) fn new(version: u64) -> Self {
        Self {
            position: 0,
            expected: ExpectedVersion::Exact(version),
        }
    }

    /// Position of the next slot to be returned.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Step forward.
    ///
    /// Fails with `CollectionModified` if `stock` was structurally mutated since the
    /// cursor was created; returns `Ok(None)` past the last slot.
    pub fn next<'a, T, S>(&mut self, stock: &'a Stock<T, S>) -> StockResult<Option<&'a Entry<T>>>
    where
        T: Item,
        S: SlotSequence<Entry<T>> + Clone + Default,
    {
        self.expected.check(stock.version())?;
        let entry = stock.slots().get(self.position);
        if entry.is_some() {
            self.position += 1;
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackledger_core::StockError;

    #[test]
    fn walks_every_slot_then_stops() {
        let stock = Stock::from_entries(10, Default::default(), vec![("a", 1), ("b", 2)]).unwrap();
        let mut cursor = stock.cursor();

        assert_eq!(cursor.next(&stock).unwrap(), Some(&Entry::new("a", 1)));
        assert_eq!(cursor.next(&stock).unwrap(), Some(&Entry::new("b", 2)));
        assert_eq!(cursor.next(&stock).unwrap(), None);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn structural_mutation_invalidates_cursor() {
        let mut stock = Stock::aggregate(10).unwrap();
        stock.add("a", 1).unwrap();
        stock.add("b", 1).unwrap();

        let mut cursor = stock.cursor();
        assert!(cursor.next(&stock).unwrap().is_some());

        stock.swap(0, 1).unwrap();
        assert_eq!(cursor.next(&stock), Err(StockError::CollectionModified));
    }

    #[test]
    fn failed_mutation_keeps_cursor_valid() {
        let mut stock = Stock::aggregate(10).unwrap();
        stock.add("a", 6).unwrap();

        let mut cursor = stock.cursor();
        assert!(stock.add("a", 6).is_err());
        assert!(stock.swap(0, 0).is_ok());
        assert_eq!(cursor.next(&stock).unwrap(), Some(&Entry::new("a", 6)));
    }

    #[test]
    fn stack_size_change_invalidates_cursor() {
        let mut stock = Stock::aggregate(10).unwrap();
        stock.add("a", 1).unwrap();

        let mut cursor = stock.cursor();
        stock.set_stack_size(20).unwrap();
        assert_eq!(cursor.next(&stock), Err(StockError::CollectionModified));
    }
}
