//! Tracing/logging setup shared by binaries, tests and benches that use the stack ledger.
//!
//! The library crates only emit `tracing` events; nothing is printed until a subscriber
//! is installed here.

/// Initialize process-wide tracing with JSON output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(tracing::LogFormat::Json);
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, init_with};
