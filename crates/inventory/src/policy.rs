//! Allocation policies: how a quantity delta lands on the slots.
//!
//! - **Aggregate**: one slot per item. A slot can never exceed the stack size, so an add
//!   that would overflow it is rejected with `StackFull`.
//! - **Overflow**: an item may spread over many slots. Adds top up the item's existing
//!   slots in sequence order and append new trailing slots for the rest; removes drain
//!   the item's slots from the highest position down (LIFO).
//!
//! Both policies work on whatever slot sequence they are handed and report every slot
//! delta into a [`ChangeSet`]. They do not roll back on error; the engine runs them
//! against a staged copy and throws the copy away when they fail.

use serde::{Deserialize, Serialize};
use tracing::trace;

use stackledger_core::{Entry, Item, Quantity, SlotSequence, StockError, StockResult};
use stackledger_events::ChangeSet;

/// Slot allocation strategy.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationPolicy {
    /// At most one slot per item.
    #[default]
    Aggregate,
    /// Items split across capped slots, drained LIFO.
    Overflow,
}

impl AllocationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            AllocationPolicy::Aggregate => "aggregate",
            AllocationPolicy::Overflow => "overflow",
        }
    }

    /// Add `quantity` units of `item`.
    pub fn apply_add<T, S>(
        self,
        slots: &mut S,
        item: &T,
        quantity: Quantity,
        stack_size: Quantity,
        changes: &mut ChangeSet<T>,
    ) -> StockResult<()>
    where
        T: Item,
        S: SlotSequence<Entry<T>>,
    {
        match self {
            AllocationPolicy::Aggregate => aggregate_add(slots, item, quantity, stack_size, changes),
            AllocationPolicy::Overflow => overflow_add(slots, item, quantity, stack_size, changes),
        }
    }

    /// Remove `quantity` units of `item`.
    pub fn apply_remove<T, S>(
        self,
        slots: &mut S,
        item: &T,
        quantity: Quantity,
        changes: &mut ChangeSet<T>,
    ) -> StockResult<()>
    where
        T: Item,
        S: SlotSequence<Entry<T>>,
    {
        match self {
            AllocationPolicy::Aggregate => aggregate_remove(slots, item, quantity, changes),
            AllocationPolicy::Overflow => overflow_remove(slots, item, quantity, changes),
        }
    }

    /// Lay out an initial set of entries on empty slots.
    ///
    /// Aggregate merges duplicate items (first occurrence keeps its position) before it
    /// checks capacity. Overflow keeps every pair separate: each one becomes its own run
    /// of slots, split at the stack size, and never tops up a slot laid down earlier.
    pub fn seed<T, S>(
        self,
        slots: &mut S,
        entries: impl IntoIterator<Item = (T, Quantity)>,
        stack_size: Quantity,
    ) -> StockResult<()>
    where
        T: Item,
        S: SlotSequence<Entry<T>>,
    {
        match self {
            AllocationPolicy::Aggregate => {
                let mut merged: Vec<(T, Quantity)> = Vec::new();
                for (item, quantity) in entries {
                    StockError::ensure_positive(quantity, "entry quantity")?;
                    match merged.iter_mut().find(|(existing, _)| *existing == item) {
                        Some((_, total)) => *total = total.saturating_add(quantity),
                        None => merged.push((item, quantity)),
                    }
                }
                for (item, quantity) in merged {
                    if quantity > stack_size {
                        return Err(StockError::stack_full(quantity, stack_size));
                    }
                    slots.push(Entry::new(item, quantity));
                }
            }
            AllocationPolicy::Overflow => {
                for (item, quantity) in entries {
                    StockError::ensure_positive(quantity, "entry quantity")?;
                    let mut remaining = quantity;
                    while remaining > 0 {
                        let chunk = remaining.min(stack_size);
                        slots.push(Entry::new(item.clone(), chunk));
                        remaining -= chunk;
                    }
                }
            }
        }
        Ok(())
    }
}

impl core::fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AllocationPolicy {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggregate" => Ok(AllocationPolicy::Aggregate),
            "overflow" => Ok(AllocationPolicy::Overflow),
            other => Err(StockError::invalid_argument(format!(
                "unknown allocation policy: {other:?}"
            ))),
        }
    }
}

fn slot_at<T, S>(slots: &S, index: usize) -> StockResult<&Entry<T>>
where
    S: SlotSequence<Entry<T>>,
{
    slots
        .get(index)
        .ok_or_else(|| StockError::out_of_range(index, slots.len()))
}

fn aggregate_add<T, S>(
    slots: &mut S,
    item: &T,
    quantity: Quantity,
    stack_size: Quantity,
    changes: &mut ChangeSet<T>,
) -> StockResult<()>
where
    T: Item,
    S: SlotSequence<Entry<T>>,
{
    match slots.first_index_where(&|e: &Entry<T>| e.item() == item) {
        None => {
            if quantity > stack_size {
                return Err(StockError::stack_full(quantity, stack_size));
            }
            slots.push(Entry::new(item.clone(), quantity));
        }
        Some(index) => {
            let total = slot_at(slots, index)?.quantity().saturating_add(quantity);
            if total > stack_size {
                return Err(StockError::stack_full(quantity, stack_size));
            }
            slots.set(index, Entry::new(item.clone(), total))?;
        }
    }
    trace!(?item, quantity, "aggregate add");
    changes.increased(item.clone(), quantity);
    Ok(())
}

fn aggregate_remove<T, S>(
    slots: &mut S,
    item: &T,
    quantity: Quantity,
    changes: &mut ChangeSet<T>,
) -> StockResult<()>
where
    T: Item,
    S: SlotSequence<Entry<T>>,
{
    let index = slots
        .first_index_where(&|e: &Entry<T>| e.item() == item)
        .ok_or(StockError::NotInStock)?;
    let current = slot_at(slots, index)?.quantity();
    if current < quantity {
        return Err(StockError::insufficient(quantity, current));
    }

    if current == quantity {
        slots.remove_at(index)?;
    } else {
        slots.set(index, Entry::new(item.clone(), current - quantity))?;
    }
    trace!(?item, quantity, index, "aggregate remove");
    changes.decreased(item.clone(), quantity);
    Ok(())
}

fn overflow_add<T, S>(
    slots: &mut S,
    item: &T,
    quantity: Quantity,
    stack_size: Quantity,
    changes: &mut ChangeSet<T>,
) -> StockResult<()>
where
    T: Item,
    S: SlotSequence<Entry<T>>,
{
    let mut remaining = quantity;

    // Top up existing slots first, in sequence order.
    for index in slots.all_indexes_where(&|e: &Entry<T>| e.item() == item) {
        if remaining == 0 {
            break;
        }
        let current = slot_at(slots, index)?.quantity();
        let spare = stack_size.saturating_sub(current);
        if spare == 0 {
            continue;
        }
        let take = spare.min(remaining);
        slots.set(index, Entry::new(item.clone(), current + take))?;
        trace!(?item, index, take, "overflow top-up");
        changes.increased(item.clone(), take);
        remaining -= take;
    }

    // Whatever is left goes into new trailing slots.
    while remaining > 0 {
        let chunk = remaining.min(stack_size);
        slots.push(Entry::new(item.clone(), chunk));
        trace!(?item, chunk, "overflow new slot");
        changes.increased(item.clone(), chunk);
        remaining -= chunk;
    }
    Ok(())
}

fn overflow_remove<T, S>(
    slots: &mut S,
    item: &T,
    quantity: Quantity,
    changes: &mut ChangeSet<T>,
) -> StockResult<()>
where
    T: Item,
    S: SlotSequence<Entry<T>>,
{
    let indexes = slots.all_indexes_where(&|e: &Entry<T>| e.item() == item);
    if indexes.is_empty() {
        return Err(StockError::NotInStock);
    }

    let mut available: Quantity = 0;
    for &index in &indexes {
        available = available.saturating_add(slot_at(slots, index)?.quantity());
    }
    if available < quantity {
        return Err(StockError::insufficient(quantity, available));
    }

    // Highest position first; removing it never shifts the lower ones.
    let mut remaining = quantity;
    for &index in indexes.iter().rev() {
        if remaining == 0 {
            break;
        }
        let current = slot_at(slots, index)?.quantity();
        let take = current.min(remaining);
        if take == current {
            slots.remove_at(index)?;
        } else {
            slots.set(index, Entry::new(item.clone(), current - take))?;
        }
        trace!(?item, index, take, "overflow drain");
        changes.decreased(item.clone(), take);
        remaining -= take;
    }
    Ok(())
}
