/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **versioned** (schema evolution)
/// - raised **after** the state they describe has been committed
pub trait Event: Clone + core::fmt::Debug {
    /// Stable event name/type identifier (e.g. "stock.added").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;
}
