//! Coalesced change events.
//!
//! A single top-level engine call may touch many slots (a predicate add, a stack size
//! decrease, an overflow drain). Every slot delta is collected into a [`ChangeSet`]
//! while the call runs and turned into exactly one [`StockChanged`] when it commits.
//!
//! Quantities in both lists are **deltas**: a slot going from 37 to 20 shows up as
//! `(item, 17)` in `old_values`, not `(item, 20)`.

use serde::{Deserialize, Serialize};

use stackledger_core::{Entry, Quantity};

use crate::event::Event;

/// What kind of change a [`StockChanged`] describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// Only quantity increases.
    Add,
    /// Only quantity decreases or removals.
    Remove,
    /// Both increases and decreases.
    Replace,
    /// Two slots exchanged positions; quantities are untouched.
    Move,
    /// Every slot was dropped at once.
    Reset,
}

/// One coalesced notification per mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChanged<T> {
    pub action: ChangeAction,
    /// Entries removed or decreased, as delta quantities.
    pub old_values: Vec<Entry<T>>,
    /// Entries added or increased, as delta quantities.
    pub new_values: Vec<Entry<T>>,
}

impl<T: Clone + core::fmt::Debug> Event for StockChanged<T> {
    fn event_type(&self) -> &'static str {
        match self.action {
            ChangeAction::Add => "stock.added",
            ChangeAction::Remove => "stock.removed",
            ChangeAction::Replace => "stock.replaced",
            ChangeAction::Move => "stock.moved",
            ChangeAction::Reset => "stock.reset",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Accumulates slot deltas for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<T> {
    old_values: Vec<Entry<T>>,
    new_values: Vec<Entry<T>>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            old_values: Vec::new(),
            new_values: Vec::new(),
        }
    }
}

impl<T> ChangeSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot gained `delta` units (or was created holding `delta`).
    pub fn increased(&mut self, item: T, delta: Quantity) {
        if delta > 0 {
            self.new_values.push(Entry::new(item, delta));
        }
    }

    /// A slot lost `delta` units (or was removed while holding `delta`).
    pub fn decreased(&mut self, item: T, delta: Quantity) {
        if delta > 0 {
            self.old_values.push(Entry::new(item, delta));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.old_values.is_empty() && self.new_values.is_empty()
    }

    pub fn old_values(&self) -> &[Entry<T>] {
        &self.old_values
    }

    pub fn new_values(&self) -> &[Entry<T>] {
        &self.new_values
    }

    /// Append the deltas of another set after this one's.
    pub fn extend(&mut self, other: ChangeSet<T>) {
        self.old_values.extend(other.old_values);
        self.new_values.extend(other.new_values);
    }

    /// Build the event, classifying the action from the recorded deltas.
    ///
    /// Returns `None` when nothing changed.
    pub fn finish(self) -> Option<StockChanged<T>> {
        let action = match (self.old_values.is_empty(), self.new_values.is_empty()) {
            (true, true) => return None,
            (true, false) => ChangeAction::Add,
            (false, true) => ChangeAction::Remove,
            (false, false) => ChangeAction::Replace,
        };
        Some(self.finish_as(action))
    }

    /// Like [`finish`](Self::finish), but an explicit action wins over classification.
    pub fn finish_with(self, action: Option<ChangeAction>) -> Option<StockChanged<T>> {
        match action {
            _ if self.is_empty() => None,
            Some(action) => Some(self.finish_as(action)),
            None => self.finish(),
        }
    }

    /// Build the event with an explicit action.
    pub fn finish_as(self, action: ChangeAction) -> StockChanged<T> {
        StockChanged {
            action,
            old_values: self.old_values,
            new_values: self.new_values,
        }
    }
}
