//! `stackledger-core`: building blocks of the stack ledger.
//!
//! This crate contains **pure** primitives (no IO, no logging setup): the error
//! taxonomy, entry value types, the slot sequence abstraction and version stamps.

pub mod entry;
pub mod error;
pub mod sequence;
pub mod value_object;
pub mod version;

pub use entry::{
    Entry, GroupedEntry, IndexedEntry, Item, Quantity, TryAddResult, TryRemoveResult,
};
pub use error::{StockError, StockResult};
pub use sequence::{SlotSequence, SlotVec};
pub use value_object::ValueObject;
pub use version::{ExpectedVersion, Versioned};
