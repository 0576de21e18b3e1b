//! Value object trait: equality by value, not identity.
//!
//! Every record the engine hands out (entries, search hits, try results) is a value
//! object: it is a snapshot of the slot it was taken from, never a live handle into it.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Two entries holding the
/// same item and quantity are equal no matter which slot (or which engine) produced them.
///
/// ```ignore
/// use stackledger_core::Entry;
///
/// let a = Entry::new("apple", 3);
/// let b = Entry::new("apple", 3);
/// assert_eq!(a, b);
/// ```
///
/// To "modify" a value object, build a new one (`Entry::with_quantity`).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
