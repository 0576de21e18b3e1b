//! The stack-limited quantity engine.
//!
//! A [`Stock`] keeps `(item, quantity)` slots in insertion order, each holding at most
//! `stack_size` units. How an add or remove is spread over the slots is decided by the
//! active [`AllocationPolicy`]; the engine validates arguments, stages the mutation,
//! and raises exactly one [`StockChanged`] per call that changed something.
//!
//! ## Invariants (after every public call)
//!
//! - every slot holds `1..=stack_size` units
//! - `quantity_of(item)` is the sum over the item's slots
//! - under `Aggregate`, at most one slot per item
//! - positions are contiguous; removal shifts later slots down
//!
//! ## Atomicity
//!
//! Mutations run against a staged copy of the slots. If the policy fails part-way (say
//! the third item of a predicate add is full) the copy is dropped and the stock is left
//! exactly as it was, with no notification and no version bump.
//!
//! ## Predicate forms
//!
//! `*_where` operations act once per **matching slot**. The items of the matching slots
//! are captured in sequence order before staging and the item operation runs for each of
//! them, all coalesced into one event. Under `Overflow` an item spread over three matching
//! slots is therefore added to (or removed from) three times.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use stackledger_core::{
    Entry, IndexedEntry, Item, Quantity, SlotSequence, SlotVec, StockError, StockResult,
    TryAddResult, TryRemoveResult, Versioned,
};
use stackledger_events::{ChangeAction, ChangeNotifier, ChangeSet, ListenerId, StockChanged};

use crate::config::StockConfig;
use crate::cursor::StockCursor;
use crate::policy::AllocationPolicy;
use crate::search::SearchResults;

/// Stack-limited quantity ledger.
#[derive(Debug)]
pub struct Stock<T, S = SlotVec<Entry<T>>> {
    slots: S,
    stack_size: Quantity,
    policy: AllocationPolicy,
    version: u64,
    notifier: ChangeNotifier<StockChanged<T>>,
}

impl<T: Item> Stock<T> {
    /// Empty stock backed by a `Vec`.
    pub fn new(stack_size: Quantity, policy: AllocationPolicy) -> StockResult<Self> {
        Self::new_in(stack_size, policy)
    }

    /// Empty stock with one slot per item.
    pub fn aggregate(stack_size: Quantity) -> StockResult<Self> {
        Self::new(stack_size, AllocationPolicy::Aggregate)
    }

    /// Empty stock that splits items over as many slots as needed.
    pub fn overflow(stack_size: Quantity) -> StockResult<Self> {
        Self::new(stack_size, AllocationPolicy::Overflow)
    }

    pub fn with_config(config: &StockConfig) -> StockResult<Self> {
        config.validate()?;
        Self::new(config.stack_size, config.policy)
    }

    /// Stock pre-filled from `(item, quantity)` pairs.
    ///
    /// See [`AllocationPolicy::seed`] for how each policy lays the pairs out. No
    /// notification is raised.
    pub fn from_entries(
        stack_size: Quantity,
        policy: AllocationPolicy,
        entries: impl IntoIterator<Item = (T, Quantity)>,
    ) -> StockResult<Self> {
        Self::from_entries_in(stack_size, policy, entries)
    }
}

impl<T, S> Stock<T, S>
where
    T: Item,
    S: SlotSequence<Entry<T>> + Clone + Default,
{
    /// Empty stock on a custom slot sequence.
    pub fn new_in(stack_size: Quantity, policy: AllocationPolicy) -> StockResult<Self> {
        StockError::ensure_positive(stack_size, "stack size")?;
        Ok(Self {
            slots: S::default(),
            stack_size,
            policy,
            version: 0,
            notifier: ChangeNotifier::new(),
        })
    }

    pub fn from_entries_in(
        stack_size: Quantity,
        policy: AllocationPolicy,
        entries: impl IntoIterator<Item = (T, Quantity)>,
    ) -> StockResult<Self> {
        let mut stock = Self::new_in(stack_size, policy)?;
        policy.seed(&mut stock.slots, entries, stack_size)?;
        Ok(stock)
    }

    pub fn stack_size(&self) -> Quantity {
        self.stack_size
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Number of slots.
    pub fn stack_count(&self) -> usize {
        self.slots.len()
    }

    /// Sum of every slot's quantity, saturating at `Quantity::MAX`.
    pub fn total_count(&self) -> Quantity {
        held(&self.slots, &|_: &Entry<T>| true)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at `index`.
    pub fn get(&self, index: usize) -> StockResult<&Entry<T>> {
        self.slots
            .get(index)
            .ok_or_else(|| StockError::out_of_range(index, self.slots.len()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.slots.iter()
    }

    /// Owned copy of every slot, in order.
    pub fn entries(&self) -> Vec<Entry<T>> {
        self.slots.iter().cloned().collect()
    }

    pub fn cursor(&self) -> StockCursor {
        StockCursor::new(self.version)
    }

    pub(crate) fn slots(&self) -> &S {
        &self.slots
    }

    pub fn quantity_of(&self, item: &T) -> Quantity {
        held(&self.slots, &|e: &Entry<T>| e.item() == item)
    }

    pub fn quantity_of_where(&self, predicate: impl Fn(&T) -> bool) -> Quantity {
        held(&self.slots, &|e: &Entry<T>| predicate(e.item()))
    }

    pub fn contains(&self, item: &T) -> bool {
        self.slots
            .first_index_where(&|e: &Entry<T>| e.item() == item)
            .is_some()
    }

    pub fn contains_where(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.slots
            .first_index_where(&|e: &Entry<T>| predicate(e.item()))
            .is_some()
    }

    pub fn search(&self, item: &T) -> SearchResults<T> {
        self.search_where(|candidate| candidate == item)
    }

    pub fn search_where(&self, predicate: impl Fn(&T) -> bool) -> SearchResults<T> {
        let hits = self
            .slots
            .all_indexes_where(&|e: &Entry<T>| predicate(e.item()))
            .into_iter()
            .filter_map(|index| {
                self.slots
                    .get(index)
                    .map(|entry| IndexedEntry::new(entry.clone(), index))
            })
            .collect();
        SearchResults::new(hits)
    }

    /// Register a callback run synchronously after every committed change.
    pub fn subscribe(&mut self, callback: impl FnMut(&StockChanged<T>) + 'static) -> ListenerId {
        self.notifier.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    pub fn notifier_mut(&mut self) -> &mut ChangeNotifier<StockChanged<T>> {
        &mut self.notifier
    }

    /// Add `quantity` units of `item` through the active policy.
    ///
    /// Under `Aggregate` this fails with `StackFull` if the item's slot would exceed the
    /// stack size. Under `Overflow` it never fails on capacity.
    pub fn add(&mut self, item: T, quantity: Quantity) -> StockResult<()> {
        StockError::ensure_positive(quantity, "quantity")?;
        let (policy, stack_size) = (self.policy, self.stack_size);
        self.stage("add", None, |slots, changes| {
            policy.apply_add(slots, &item, quantity, stack_size, changes)
        })
    }

    /// Add `quantity` units once for every slot whose item matches `predicate`.
    pub fn add_where(&mut self, predicate: impl Fn(&T) -> bool, quantity: Quantity) -> StockResult<()> {
        StockError::ensure_positive(quantity, "quantity")?;
        let items = self.matching_items(&predicate);
        if items.is_empty() {
            return Err(StockError::NoMatch);
        }
        let (policy, stack_size) = (self.policy, self.stack_size);
        self.stage("add_where", None, |slots, changes| {
            items
                .iter()
                .try_for_each(|item| policy.apply_add(slots, item, quantity, stack_size, changes))
        })
    }

    /// Add as much of `quantity` as fits, reporting the rest.
    ///
    /// Room is `stack_size - quantity_of(item)` under both policies, so under `Overflow`
    /// this can refuse units that [`add`](Self::add) would have accepted into new slots.
    pub fn try_add(&mut self, item: T, quantity: Quantity) -> StockResult<TryAddResult> {
        StockError::ensure_positive(quantity, "quantity")?;
        let (policy, stack_size) = (self.policy, self.stack_size);
        self.stage("try_add", None, |slots, changes| {
            try_add_one(policy, slots, &item, quantity, stack_size, changes)
        })
    }

    /// [`try_add`](Self::try_add) once per matching slot; results are summed.
    ///
    /// Matching nothing is not an error and yields an empty result.
    pub fn try_add_where(
        &mut self,
        predicate: impl Fn(&T) -> bool,
        quantity: Quantity,
    ) -> StockResult<TryAddResult> {
        StockError::ensure_positive(quantity, "quantity")?;
        let items = self.matching_items(&predicate);
        let (policy, stack_size) = (self.policy, self.stack_size);
        self.stage("try_add_where", None, |slots, changes| {
            items.iter().try_fold(
                TryAddResult::default(),
                |acc, item| -> StockResult<TryAddResult> {
                    Ok(acc + try_add_one(policy, slots, item, quantity, stack_size, changes)?)
                },
            )
        })
    }

    /// Remove `quantity` units of `item`.
    ///
    /// Fails with `NotInStock` if the item has no slot and `InsufficientStock` if it holds
    /// fewer than `quantity` units.
    pub fn remove(&mut self, item: &T, quantity: Quantity) -> StockResult<()> {
        StockError::ensure_positive(quantity, "quantity")?;
        let policy = self.policy;
        self.stage("remove", None, |slots, changes| {
            policy.apply_remove(slots, item, quantity, changes)
        })
    }

    /// Remove `quantity` units once for every slot whose item matches `predicate`.
    pub fn remove_where(
        &mut self,
        predicate: impl Fn(&T) -> bool,
        quantity: Quantity,
    ) -> StockResult<()> {
        StockError::ensure_positive(quantity, "quantity")?;
        let items = self.matching_items(&predicate);
        if items.is_empty() {
            return Err(StockError::NoMatch);
        }
        let policy = self.policy;
        self.stage("remove_where", None, |slots, changes| {
            items
                .iter()
                .try_for_each(|item| policy.apply_remove(slots, item, quantity, changes))
        })
    }

    /// Remove up to `quantity` units of `item`, reporting what could not be removed.
    pub fn try_remove(&mut self, item: &T, quantity: Quantity) -> StockResult<TryRemoveResult> {
        StockError::ensure_positive(quantity, "quantity")?;
        let policy = self.policy;
        self.stage("try_remove", None, |slots, changes| {
            try_remove_one(policy, slots, item, quantity, changes)
        })
    }

    /// [`try_remove`](Self::try_remove) once per matching slot; results are summed.
    pub fn try_remove_where(
        &mut self,
        predicate: impl Fn(&T) -> bool,
        quantity: Quantity,
    ) -> StockResult<TryRemoveResult> {
        StockError::ensure_positive(quantity, "quantity")?;
        let items = self.matching_items(&predicate);
        let policy = self.policy;
        self.stage("try_remove_where", None, |slots, changes| {
            items.iter().try_fold(
                TryRemoveResult::default(),
                |acc, item| -> StockResult<TryRemoveResult> {
                    Ok(acc + try_remove_one(policy, slots, item, quantity, changes)?)
                },
            )
        })
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        let result = self.stage("clear", Some(ChangeAction::Reset), |slots, changes| {
            for entry in slots.iter() {
                changes.decreased(entry.item().clone(), entry.quantity());
            }
            slots.clear();
            Ok(())
        });
        debug_assert!(result.is_ok());
    }

    /// Drop every slot holding `item`.
    pub fn clear_item(&mut self, item: &T) -> StockResult<()> {
        self.clear_matching("clear_item", &|candidate: &T| candidate == item)
    }

    /// Drop every slot whose item matches `predicate`.
    pub fn clear_where(&mut self, predicate: impl Fn(&T) -> bool) -> StockResult<()> {
        self.clear_matching("clear_where", &predicate)
    }

    fn clear_matching(&mut self, op: &'static str, predicate: &dyn Fn(&T) -> bool) -> StockResult<()> {
        self.stage(op, None, |slots, changes| {
            let indexes = slots.all_indexes_where(&|e: &Entry<T>| predicate(e.item()));
            for &index in &indexes {
                if let Some(entry) = slots.get(index) {
                    changes.decreased(entry.item().clone(), entry.quantity());
                }
            }
            for &index in indexes.iter().rev() {
                slots.remove_at(index)?;
            }
            Ok(())
        })
    }

    /// Exchange the slots at `a` and `b`.
    ///
    /// Both positions are checked first; `a == b` is then a no-op without notification.
    pub fn swap(&mut self, a: usize, b: usize) -> StockResult<()> {
        let len = self.slots.len();
        for index in [a, b] {
            if index >= len {
                return Err(StockError::out_of_range(index, len));
            }
        }
        if a == b {
            return Ok(());
        }

        self.stage("swap", Some(ChangeAction::Move), |slots, changes| {
            let first = slots.get(a).cloned().ok_or_else(|| StockError::out_of_range(a, len))?;
            let second = slots.get(b).cloned().ok_or_else(|| StockError::out_of_range(b, len))?;
            slots.swap(a, b)?;

            let (first_item, first_qty) = first.into_parts();
            let (second_item, second_qty) = second.into_parts();
            changes.decreased(first_item.clone(), first_qty);
            changes.decreased(second_item.clone(), second_qty);
            changes.increased(second_item, second_qty);
            changes.increased(first_item, first_qty);
            Ok(())
        })
    }

    /// Change the per-slot capacity.
    ///
    /// Lowering it truncates every larger slot to the new cap in one pass (the excess
    /// is discarded, not moved to new slots) and raises one notification listing every
    /// truncated delta. Raising it touches no slot and notifies nobody.
    pub fn set_stack_size(&mut self, stack_size: Quantity) -> StockResult<()> {
        StockError::ensure_positive(stack_size, "stack size")?;
        let previous = self.stack_size;
        if stack_size == previous {
            return Ok(());
        }

        let before = self.version;
        if stack_size < previous {
            let lost = self.stage("set_stack_size", None, |slots, changes| {
                let mut lost: Quantity = 0;
                for index in 0..slots.len() {
                    let Some(entry) = slots.get(index) else { continue };
                    if entry.quantity() > stack_size {
                        let excess = entry.quantity() - stack_size;
                        let truncated = entry.with_quantity(stack_size);
                        changes.decreased(truncated.item().clone(), excess);
                        slots.set(index, truncated)?;
                        lost += excess;
                    }
                }
                Ok(lost)
            })?;
            if lost > 0 {
                warn!(previous, stack_size, lost, "stack size decrease discarded quantity");
            }
        }

        self.stack_size = stack_size;
        if self.version == before {
            self.version += 1;
        }
        debug!(previous, stack_size, "stack size changed");
        Ok(())
    }

    /// Items of the slots matching `predicate`, one per slot, in sequence order.
    fn matching_items(&self, predicate: &dyn Fn(&T) -> bool) -> Vec<T> {
        self.slots
            .iter()
            .filter(|entry| predicate(entry.item()))
            .map(|entry| entry.item().clone())
            .collect()
    }

    /// Run `mutate` against a copy of the slots; commit and notify only on success.
    fn stage<R>(
        &mut self,
        op: &'static str,
        action: Option<ChangeAction>,
        mutate: impl FnOnce(&mut S, &mut ChangeSet<T>) -> StockResult<R>,
    ) -> StockResult<R> {
        let mut staged = self.slots.clone();
        let mut changes = ChangeSet::new();

        let out = match mutate(&mut staged, &mut changes) {
            Ok(out) => out,
            Err(err) => {
                debug!(op, error = %err, "stock mutation rejected");
                return Err(err);
            }
        };

        let Some(event) = changes.finish_with(action) else {
            return Ok(out);
        };

        self.slots = staged;
        self.version += 1;
        debug!(
            op,
            old = event.old_values.len(),
            new = event.new_values.len(),
            version = self.version,
            "stock mutation committed"
        );
        self.notifier.publish(&event);
        Ok(out)
    }
}

fn held<T, S>(slots: &S, predicate: &dyn Fn(&Entry<T>) -> bool) -> Quantity
where
    S: SlotSequence<Entry<T>>,
{
    slots
        .iter()
        .filter(|e| predicate(*e))
        .fold(0, |total: Quantity, e| total.saturating_add(e.quantity()))
}

fn try_add_one<T, S>(
    policy: AllocationPolicy,
    slots: &mut S,
    item: &T,
    quantity: Quantity,
    stack_size: Quantity,
    changes: &mut ChangeSet<T>,
) -> StockResult<TryAddResult>
where
    T: Item,
    S: SlotSequence<Entry<T>>,
{
    let room = stack_size.saturating_sub(held(slots, &|e: &Entry<T>| e.item() == item));
    let added = quantity.min(room);
    if added > 0 {
        policy.apply_add(slots, item, added, stack_size, changes)?;
    }
    Ok(TryAddResult::new(added, quantity - added))
}

fn try_remove_one<T, S>(
    policy: AllocationPolicy,
    slots: &mut S,
    item: &T,
    quantity: Quantity,
    changes: &mut ChangeSet<T>,
) -> StockResult<TryRemoveResult>
where
    T: Item,
    S: SlotSequence<Entry<T>>,
{
    let removed = quantity.min(held(slots, &|e: &Entry<T>| e.item() == item));
    if removed > 0 {
        policy.apply_remove(slots, item, removed, changes)?;
    }
    Ok(TryRemoveResult::new(removed, quantity - removed))
}

impl<T, S> Versioned for Stock<T, S> {
    fn version(&self) -> u64 {
        self.version
    }
}

impl<T, S> core::ops::Index<usize> for Stock<T, S>
where
    T: Item,
    S: SlotSequence<Entry<T>> + Clone + Default,
{
    type Output = Entry<T>;

    /// # Panics
    ///
    /// Panics if `index` is out of range; use [`Stock::get`] for a checked lookup.
    fn index(&self, index: usize) -> &Entry<T> {
        match self.get(index) {
            Ok(entry) => entry,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Listeners are not cloned; the copy starts with none.
impl<T, S> Clone for Stock<T, S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            stack_size: self.stack_size,
            policy: self.policy,
            version: self.version,
            notifier: ChangeNotifier::new(),
        }
    }
}

/// Equal when stack sizes match and slots are equal in order. Policy is not compared.
impl<T, S> PartialEq for Stock<T, S>
where
    T: PartialEq,
    S: SlotSequence<Entry<T>>,
{
    fn eq(&self, other: &Self) -> bool {
        self.stack_size == other.stack_size
            && self.slots.len() == other.slots.len()
            && self.slots.iter().eq(other.slots.iter())
    }
}

impl<T, S> Eq for Stock<T, S>
where
    T: Eq,
    S: SlotSequence<Entry<T>>,
{
}

impl<T, S> core::hash::Hash for Stock<T, S>
where
    T: core::hash::Hash,
    S: SlotSequence<Entry<T>>,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.stack_size.hash(state);
        self.slots.len().hash(state);
        for entry in self.slots.iter() {
            entry.hash(state);
        }
    }
}

#[derive(Serialize)]
struct StockRef<'a, T> {
    stack_size: Quantity,
    policy: AllocationPolicy,
    entries: Vec<&'a Entry<T>>,
}

#[derive(Deserialize)]
struct StockSnapshot<T> {
    stack_size: Quantity,
    #[serde(default)]
    policy: AllocationPolicy,
    entries: Vec<Entry<T>>,
}

impl<T, S> Serialize for Stock<T, S>
where
    T: Serialize,
    S: SlotSequence<Entry<T>>,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        StockRef {
            stack_size: self.stack_size,
            policy: self.policy,
            entries: self.slots.iter().collect(),
        }
        .serialize(serializer)
    }
}

/// Rebuilt through `from_entries_in`, so every invariant is checked again.
impl<'de, T, S> Deserialize<'de> for Stock<T, S>
where
    T: Item + Deserialize<'de>,
    S: SlotSequence<Entry<T>> + Clone + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snapshot = StockSnapshot::<T>::deserialize(deserializer)?;
        Self::from_entries_in(
            snapshot.stack_size,
            snapshot.policy,
            snapshot.entries.into_iter().map(Entry::into_parts),
        )
        .map_err(serde::de::Error::custom)
    }
}
