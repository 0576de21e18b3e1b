//! Channel-backed subscriptions.
//!
//! Listeners registered with a callback run synchronously inside the mutating call. A
//! [`Subscription`] instead receives a clone of every event over an `mpsc` channel, so
//! the consumer can drain notifications whenever it likes (tests, batch consumers).
//!
//! ```ignore
//! let sub = stock.notifier_mut().channel();
//! stock.add("apple", 3)?;
//! let events = sub.drain();
//! assert_eq!(events.len(), 1);
//! ```
//!
//! Dropping the subscription detaches it: the notifier prunes disconnected senders on
//! the next publish.

use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a notification stream.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything delivered so far, oldest first.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}
