//! Slot sequence abstraction (ordered, index-addressable storage).
//!
//! The quantity engine never touches its storage except through [`SlotSequence`], so any
//! ordered container can back it. [`SlotVec`] is the plain `Vec` implementation.
//!
//! Positions are always contiguous `0..len`; removing a slot shifts every later slot
//! down by one.

use crate::error::{StockError, StockResult};

/// Ordered, index-addressable store of slots.
pub trait SlotSequence<E> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&E>;

    /// Replace the slot at `index`, returning the previous value.
    fn set(&mut self, index: usize, value: E) -> StockResult<E>;

    /// Append at the end.
    fn push(&mut self, value: E);

    fn insert(&mut self, index: usize, value: E) -> StockResult<()>;

    fn remove_at(&mut self, index: usize) -> StockResult<E>;

    fn swap(&mut self, a: usize, b: usize) -> StockResult<()>;

    fn clear(&mut self);

    fn first_index_where(&self, predicate: &dyn Fn(&E) -> bool) -> Option<usize> {
        (0..self.len()).find(|&i| self.get(i).is_some_and(|e| predicate(e)))
    }

    fn all_indexes_where(&self, predicate: &dyn Fn(&E) -> bool) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.get(i).is_some_and(|e| predicate(e)))
            .collect()
    }

    /// Slots in sequence order.
    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a E>
    where
        Self: Sized,
        E: 'a,
    {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// `Vec`-backed slot sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotVec<E> {
    slots: Vec<E>,
}

impl<E> SlotVec<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub fn as_slice(&self) -> &[E] {
        &self.slots
    }

    fn check(&self, index: usize) -> StockResult<()> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(StockError::out_of_range(index, self.slots.len()))
        }
    }
}

impl<E> Default for SlotVec<E> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<E> FromIterator<E> for SlotVec<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl<E> SlotSequence<E> for SlotVec<E> {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn get(&self, index: usize) -> Option<&E> {
        self.slots.get(index)
    }

    fn set(&mut self, index: usize, value: E) -> StockResult<E> {
        self.check(index)?;
        Ok(core::mem::replace(&mut self.slots[index], value))
    }

    fn push(&mut self, value: E) {
        self.slots.push(value);
    }

    fn insert(&mut self, index: usize, value: E) -> StockResult<()> {
        // Inserting at `len` is an append.
        if index > self.slots.len() {
            return Err(StockError::out_of_range(index, self.slots.len()));
        }
        self.slots.insert(index, value);
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> StockResult<E> {
        self.check(index)?;
        Ok(self.slots.remove(index))
    }

    fn swap(&mut self, a: usize, b: usize) -> StockResult<()> {
        self.check(a)?;
        self.check(b)?;
        self.slots.swap(a, b);
        Ok(())
    }

    fn clear(&mut self) {
        self.slots.clear();
    }

    fn first_index_where(&self, predicate: &dyn Fn(&E) -> bool) -> Option<usize> {
        self.slots.iter().position(predicate)
    }

    fn all_indexes_where(&self, predicate: &dyn Fn(&E) -> bool) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, e)| predicate(e).then_some(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> SlotVec<char> {
        "abcd".chars().collect()
    }

    #[test]
    fn remove_shifts_later_positions_down() {
        let mut seq = letters();
        assert_eq!(seq.remove_at(1).unwrap(), 'b');
        assert_eq!(seq.as_slice(), &['a', 'c', 'd']);
        assert_eq!(seq.get(1), Some(&'c'));
    }

    #[test]
    fn out_of_range_access_is_reported() {
        let mut seq = letters();
        assert_eq!(
            seq.remove_at(4),
            Err(StockError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert!(seq.swap(0, 9).is_err());
        assert!(seq.set(7, 'z').is_err());
        assert!(seq.insert(5, 'z').is_err());
        assert_eq!(seq.as_slice(), &['a', 'b', 'c', 'd']);
    }

    #[test]
    fn insert_at_len_appends() {
        let mut seq = letters();
        seq.insert(4, 'e').unwrap();
        seq.insert(0, '_').unwrap();
        assert_eq!(seq.as_slice(), &['_', 'a', 'b', 'c', 'd', 'e']);
    }

    #[test]
    fn predicate_lookups() {
        let seq: SlotVec<u32> = vec![3, 8, 5, 8].into_iter().collect();
        assert_eq!(seq.first_index_where(&|v| *v == 8), Some(1));
        assert_eq!(seq.all_indexes_where(&|v| *v == 8), vec![1, 3]);
        assert_eq!(seq.first_index_where(&|v| *v == 0), None);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![3, 8, 5, 8]);
    }

    #[test]
    fn iter_over_borrowed_elements() {
        let owned = String::from("bolt nut washer");
        let seq: SlotVec<&str> = owned.split(' ').collect();

        fn longest<'a, S: SlotSequence<&'a str>>(seq: &S) -> Option<&'a str> {
            seq.iter().copied().max_by_key(|s| s.len())
        }

        assert_eq!(seq.iter().count(), 3);
        assert_eq!(longest(&seq), Some("washer"));
    }

    #[test]
    fn set_returns_previous_value() {
        let mut seq = letters();
        assert_eq!(seq.set(2, 'x').unwrap(), 'c');
        assert_eq!(seq.get(2), Some(&'x'));
    }
}
