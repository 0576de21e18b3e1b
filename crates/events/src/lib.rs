//! Change events and their synchronous delivery.

pub mod bus;
pub mod change;
pub mod event;
pub mod notifier;

pub use bus::Subscription;
pub use change::{ChangeAction, ChangeSet, StockChanged};
pub use event::Event;
pub use notifier::{ChangeNotifier, ListenerId};
