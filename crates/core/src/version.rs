//! Structural version stamps.
//!
//! Every structural mutation of a slot sequence owner bumps a monotonically increasing
//! counter. Readers that walk the slots without holding a borrow (cursors) remember the
//! stamp they started from and re-check it on every step.

use crate::error::{StockError, StockResult};

/// Owner of a structural version counter.
pub trait Versioned {
    /// Monotonically increasing version of the structure.
    ///
    /// Bumped once per top-level mutation that changed slots or capacity.
    fn version(&self) -> u64;
}

/// Version expectation for a reader.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking.
    Any,
    /// Require the structure to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> StockResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(StockError::CollectionModified)
        }
    }
}
