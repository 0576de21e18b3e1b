//! Synchronous change notifier.

use std::sync::mpsc;

use crate::bus::Subscription;

/// Handle returned by [`ChangeNotifier::subscribe`], used to detach a listener.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

enum Listener<M> {
    Callback(Box<dyn FnMut(&M)>),
    Channel(mpsc::Sender<M>),
}

/// In-process, single-threaded fan-out of events to listeners.
///
/// - No IO / no async
/// - Listeners run in registration order, inside `publish`
/// - Channel listeners whose receiver was dropped are pruned while publishing
pub struct ChangeNotifier<M> {
    listeners: Vec<(ListenerId, Listener<M>)>,
    next_id: u64,
}

impl<M> ChangeNotifier<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked once per published event.
    pub fn subscribe(&mut self, callback: impl FnMut(&M) + 'static) -> ListenerId {
        self.register(Listener::Callback(Box::new(callback)))
    }

    /// Register a channel listener and hand back its receiving end.
    pub fn channel(&mut self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();
        self.register(Listener::Channel(tx));
        Subscription::new(rx)
    }

    /// Detach a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn register(&mut self, listener: Listener<M>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }
}

impl<M: Clone> ChangeNotifier<M> {
    /// Deliver `message` to every listener.
    pub fn publish(&mut self, message: &M) {
        // Drop any dead channel listeners while publishing.
        self.listeners.retain_mut(|(_, listener)| match listener {
            Listener::Callback(callback) => {
                callback(message);
                true
            }
            Listener::Channel(tx) => tx.send(message.clone()).is_ok(),
        });
    }
}

impl<M> Default for ChangeNotifier<M> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<M> core::fmt::Debug for ChangeNotifier<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
