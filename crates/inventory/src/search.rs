//! Search results and per-item grouping.

use stackledger_core::{GroupedEntry, IndexedEntry, Item, Quantity};

/// Ordered matches of a search, each carrying the position it was found at.
///
/// A snapshot: positions go stale after any structural mutation of the stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults<T> {
    hits: Vec<IndexedEntry<T>>,
}

impl<T> SearchResults<T> {
    pub(crate) fn new(hits: Vec<IndexedEntry<T>>) -> Self {
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn as_slice(&self) -> &[IndexedEntry<T>] {
        &self.hits
    }

    pub fn iter(&self) -> core::slice::Iter<'_, IndexedEntry<T>> {
        self.hits.iter()
    }

    pub fn indexes(&self) -> Vec<usize> {
        self.hits.iter().map(IndexedEntry::index).collect()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.hits
            .iter()
            .fold(0, |total: Quantity, hit| total.saturating_add(hit.quantity()))
    }

    pub fn into_vec(self) -> Vec<IndexedEntry<T>> {
        self.hits
    }
}

impl<T: Item> SearchResults<T> {
    /// Collapse matches of the same item: quantities summed, indexes in encounter order.
    ///
    /// Groups appear in the order their item was first encountered.
    pub fn group(&self) -> Vec<GroupedEntry<T>> {
        let mut groups: Vec<GroupedEntry<T>> = Vec::new();
        for hit in &self.hits {
            match groups.iter_mut().find(|g| g.item() == hit.item()) {
                Some(group) => group.absorb(hit.quantity(), hit.index()),
                None => groups.push(GroupedEntry::new(
                    hit.item().clone(),
                    hit.quantity(),
                    vec![hit.index()],
                )),
            }
        }
        groups
    }
}

impl<T> IntoIterator for SearchResults<T> {
    type Item = IndexedEntry<T>;
    type IntoIter = std::vec::IntoIter<IndexedEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a SearchResults<T> {
    type Item = &'a IndexedEntry<T>;
    type IntoIter = core::slice::Iter<'a, IndexedEntry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
