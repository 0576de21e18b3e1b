use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use stackledger_inventory::{
    AllocationPolicy, ChangeAction, Entry, Item, SlotSequence, Stock, StockChanged, StockConfig,
    StockError, StockResult, TryAddResult,
};

/// Slot storage on a `VecDeque`, to drive the engine through the sequence trait only.
#[derive(Debug, Clone)]
struct DequeSlots<E> {
    inner: VecDeque<E>,
}

impl<E> Default for DequeSlots<E> {
    fn default() -> Self {
        Self {
            inner: VecDeque::new(),
        }
    }
}

impl<E> SlotSequence<E> for DequeSlots<E> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn get(&self, index: usize) -> Option<&E> {
        self.inner.get(index)
    }

    fn set(&mut self, index: usize, value: E) -> StockResult<E> {
        let len = self.inner.len();
        let slot = self
            .inner
            .get_mut(index)
            .ok_or(StockError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, value))
    }

    fn push(&mut self, value: E) {
        self.inner.push_back(value);
    }

    fn insert(&mut self, index: usize, value: E) -> StockResult<()> {
        if index > self.inner.len() {
            return Err(StockError::out_of_range(index, self.inner.len()));
        }
        self.inner.insert(index, value);
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> StockResult<E> {
        let len = self.inner.len();
        self.inner
            .remove(index)
            .ok_or(StockError::IndexOutOfRange { index, len })
    }

    fn swap(&mut self, a: usize, b: usize) -> StockResult<()> {
        let len = self.inner.len();
        for index in [a, b] {
            if index >= len {
                return Err(StockError::out_of_range(index, len));
            }
        }
        self.inner.swap(a, b);
        Ok(())
    }

    fn clear(&mut self) {
        self.inner.clear();
    }
}

fn recorder<T, S>(stock: &mut Stock<T, S>) -> Rc<RefCell<Vec<StockChanged<T>>>>
where
    T: Item + 'static,
    S: SlotSequence<Entry<T>> + Clone + Default,
{
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    stock.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn warehouse_day_on_custom_storage() {
    stackledger_observability::init_with(stackledger_observability::LogFormat::Pretty);

    let mut stock: Stock<String, DequeSlots<Entry<String>>> =
        Stock::new_in(10, AllocationPolicy::Overflow).unwrap();
    let events = recorder(&mut stock);

    stock.add("bolt".to_string(), 25).unwrap();
    stock.add("nut".to_string(), 4).unwrap();
    stock.remove(&"bolt".to_string(), 12).unwrap();
    stock.swap(0, 2).unwrap();

    let layout: Vec<(String, u64)> = stock
        .iter()
        .map(|e| (e.item().clone(), e.quantity()))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("nut".to_string(), 4),
            ("bolt".to_string(), 3),
            ("bolt".to_string(), 10),
        ]
    );
    assert_eq!(stock.total_count(), 17);

    let actions: Vec<ChangeAction> = events.borrow().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            ChangeAction::Add,
            ChangeAction::Add,
            ChangeAction::Remove,
            ChangeAction::Move,
        ]
    );
}

#[test]
fn configured_stock_from_lookup() {
    let config = StockConfig::from_lookup(|key| match key {
        "STACKLEDGER_STACK_SIZE" => Some("5".to_string()),
        "STACKLEDGER_POLICY" => Some("aggregate".to_string()),
        _ => None,
    })
    .unwrap();

    let mut stock = Stock::with_config(&config).unwrap();
    assert_eq!(stock.try_add("crate", 8).unwrap(), TryAddResult::new(5, 3));
    assert_eq!(stock.add("crate", 1), Err(StockError::stack_full(6, 5)));
}

#[test]
fn cursor_detects_changes_made_between_steps() {
    let mut stock = Stock::aggregate(10).unwrap();
    stock.add("a", 1).unwrap();
    stock.add("b", 1).unwrap();

    let mut cursor = stock.cursor();
    let mut seen = Vec::new();
    while let Some(entry) = cursor.next(&stock).unwrap() {
        seen.push(*entry.item());
    }
    assert_eq!(seen, vec!["a", "b"]);

    let mut cursor = stock.cursor();
    cursor.next(&stock).unwrap();
    stock.clear_item(&"b").unwrap();
    assert_eq!(cursor.next(&stock), Err(StockError::CollectionModified));
}
