//! Entry value types: slots, search hits, grouped hits and lenient-operation results.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// Quantity held by a slot (always strictly positive while the slot exists).
pub type Quantity = u64;

/// Anything that can be stocked.
///
/// Items are compared by value. Use `Option<U>` as the item type when "no item" must be a
/// valid key of its own.
pub trait Item: Clone + PartialEq + core::fmt::Debug {}

impl<T> Item for T where T: Clone + PartialEq + core::fmt::Debug {}

/// One (item, quantity) record.
///
/// The engine stores these as its slots and reports them (as deltas) in change events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry<T> {
    item: T,
    quantity: Quantity,
}

impl<T> Entry<T> {
    pub fn new(item: T, quantity: Quantity) -> Self {
        Self { item, quantity }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Same item, different quantity.
    pub fn with_quantity(&self, quantity: Quantity) -> Self
    where
        T: Clone,
    {
        Self {
            item: self.item.clone(),
            quantity,
        }
    }

    pub fn into_parts(self) -> (T, Quantity) {
        (self.item, self.quantity)
    }
}

impl<T> From<(T, Quantity)> for Entry<T> {
    fn from((item, quantity): (T, Quantity)) -> Self {
        Self::new(item, quantity)
    }
}

impl<T: Item> ValueObject for Entry<T> {}

/// A slot together with the position it occupied when it was found.
///
/// Stale as soon as the engine is structurally mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexedEntry<T> {
    entry: Entry<T>,
    index: usize,
}

impl<T> IndexedEntry<T> {
    pub fn new(entry: Entry<T>, index: usize) -> Self {
        Self { entry, index }
    }

    pub fn entry(&self) -> &Entry<T> {
        &self.entry
    }

    pub fn item(&self) -> &T {
        self.entry.item()
    }

    pub fn quantity(&self) -> Quantity {
        self.entry.quantity()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T: Item> ValueObject for IndexedEntry<T> {}

/// All search hits for one item, collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupedEntry<T> {
    item: T,
    quantity: Quantity,
    indexes: Vec<usize>,
}

impl<T> GroupedEntry<T> {
    pub fn new(item: T, quantity: Quantity, indexes: Vec<usize>) -> Self {
        Self {
            item,
            quantity,
            indexes,
        }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    /// Sum of the quantities of every contributing slot.
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Contributing positions, in encounter order.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// Fold one more matching slot into the group.
    pub fn absorb(&mut self, quantity: Quantity, index: usize) {
        self.quantity = self.quantity.saturating_add(quantity);
        self.indexes.push(index);
    }
}

impl<T: Item> ValueObject for GroupedEntry<T> {}

/// Outcome of a lenient add: what went in and what did not.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TryAddResult {
    pub added: Quantity,
    pub not_added: Quantity,
}

impl TryAddResult {
    pub fn new(added: Quantity, not_added: Quantity) -> Self {
        Self { added, not_added }
    }

    /// Always equals the requested quantity.
    pub fn total(&self) -> Quantity {
        self.added.saturating_add(self.not_added)
    }

    pub fn is_complete(&self) -> bool {
        self.not_added == 0
    }
}

impl core::ops::Add for TryAddResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.added.saturating_add(rhs.added),
            self.not_added.saturating_add(rhs.not_added),
        )
    }
}

impl ValueObject for TryAddResult {}

/// Outcome of a lenient remove: what came out and what could not.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TryRemoveResult {
    pub removed: Quantity,
    pub not_removed: Quantity,
}

impl TryRemoveResult {
    pub fn new(removed: Quantity, not_removed: Quantity) -> Self {
        Self {
            removed,
            not_removed,
        }
    }

    /// Always equals the requested quantity.
    pub fn total(&self) -> Quantity {
        self.removed.saturating_add(self.not_removed)
    }

    pub fn is_complete(&self) -> bool {
        self.not_removed == 0
    }
}

impl core::ops::Add for TryRemoveResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.removed.saturating_add(rhs.removed),
            self.not_removed.saturating_add(rhs.not_removed),
        )
    }
}

impl ValueObject for TryRemoveResult {}
