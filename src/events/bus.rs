//! # Event bus for broadcasting group events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing from the control path of both phases.
//!
//! ```text
//! Publishers:                        Receivers:
//!   Group::wait ─────┐
//!   Stopping::shutdown ┼──► Bus ──┬──► subscriber listener ──► SubscriberSet
//!   SubscriberSet ───┘           └──► Group::subscribe() receivers
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: one ring buffer shared by all receivers; laggards get
//!   `RecvError::Lagged(n)` and skip the `n` oldest items.
//! - **No persistence**: events sent with no receivers are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for group events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
