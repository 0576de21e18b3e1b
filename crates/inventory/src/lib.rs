//! Stack-limited quantity engine.
//!
//! This crate holds the allocation rules for stacked quantities, implemented purely as
//! deterministic in-memory logic (no IO, no storage, no threads).

pub mod config;
pub mod cursor;
pub mod policy;
pub mod search;
pub mod stock;

pub use config::StockConfig;
pub use cursor::StockCursor;
pub use policy::AllocationPolicy;
pub use search::SearchResults;
pub use stock::Stock;

pub use stackledger_core::{
    Entry, GroupedEntry, IndexedEntry, Item, Quantity, SlotSequence, SlotVec, StockError,
    StockResult, TryAddResult, TryRemoveResult, Versioned,
};
pub use stackledger_events::{ChangeAction, ListenerId, StockChanged, Subscription};
