//! Stock configuration.

use serde::{Deserialize, Serialize};

use stackledger_core::{Quantity, StockError, StockResult};

use crate::policy::AllocationPolicy;

/// Environment variable holding the stack size.
pub const STACK_SIZE_ENV: &str = "STACKLEDGER_STACK_SIZE";
/// Environment variable holding the allocation policy (`aggregate` | `overflow`).
pub const POLICY_ENV: &str = "STACKLEDGER_POLICY";

/// Stock configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    /// Maximum quantity per slot
    pub stack_size: Quantity,
    /// How quantities are laid out on slots
    pub policy: AllocationPolicy,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            stack_size: 64,
            policy: AllocationPolicy::Aggregate,
        }
    }
}

impl StockConfig {
    pub fn with_stack_size(mut self, stack_size: Quantity) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn with_policy(mut self, policy: AllocationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Read overrides from `STACKLEDGER_STACK_SIZE` / `STACKLEDGER_POLICY`.
    ///
    /// Unset variables keep their defaults; set but unparsable ones are an error.
    pub fn from_env() -> StockResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StockResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(STACK_SIZE_ENV) {
            config.stack_size = raw.trim().parse().map_err(|e| {
                StockError::invalid_argument(format!("{STACK_SIZE_ENV}={raw:?}: {e}"))
            })?;
        }
        if let Some(raw) = lookup(POLICY_ENV) {
            config.policy = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StockResult<()> {
        StockError::ensure_positive(self.stack_size, "stack size")
    }
}
