//! Stock error model.

use thiserror::Error;

use crate::entry::Quantity;

/// Result type used across the stock engine.
pub type StockResult<T> = Result<T, StockError>;

/// Stock-level error.
///
/// Every variant is deterministic: the engine has no IO and no transient failures, so
/// nothing here is ever retried internally. A strict operation that returns one of these
/// leaves the engine exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// An argument failed validation (zero quantity, zero stack size, bad config value).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Adding `quantity` would push a single-slot item above the stack size.
    #[error("stack full: cannot fit quantity {quantity} within stack size {stack_size}")]
    StackFull { quantity: Quantity, stack_size: Quantity },

    /// A strict removal targeted an item that has no slot.
    #[error("item not in stock")]
    NotInStock,

    /// A strict removal asked for more than is held.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        requested: Quantity,
        available: Quantity,
    },

    /// A strict predicate operation matched no slot.
    #[error("no slot matched the predicate")]
    NoMatch,

    /// A positional access was out of bounds.
    #[error("index {index} out of range for {len} slots")]
    IndexOutOfRange { index: usize, len: usize },

    /// The slots changed structurally while a cursor was walking them.
    #[error("collection was modified; enumeration cannot continue")]
    CollectionModified,
}

impl StockError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn stack_full(quantity: Quantity, stack_size: Quantity) -> Self {
        Self::StackFull {
            quantity,
            stack_size,
        }
    }

    pub fn insufficient(requested: Quantity, available: Quantity) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Ensure a requested quantity is strictly positive.
    pub fn ensure_positive(quantity: Quantity, what: &str) -> StockResult<()> {
        if quantity == 0 {
            return Err(Self::invalid_argument(format!("{what} must be greater than zero")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_quantities() {
        let err = StockError::stack_full(12, 10);
        assert_eq!(
            err.to_string(),
            "stack full: cannot fit quantity 12 within stack size 10"
        );

        let err = StockError::insufficient(5, 2);
        assert_eq!(err.to_string(), "insufficient stock: requested 5, available 2");
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert!(StockError::ensure_positive(1, "quantity").is_ok());
        match StockError::ensure_positive(0, "quantity") {
            Err(StockError::InvalidArgument(msg)) => assert!(msg.contains("quantity")),
            other => panic!("expected invalid argument, got {other:?}"),
        }
    }
}
