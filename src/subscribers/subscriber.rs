//! # Observing a group from the outside.
//!
//! A [`Subscribe`] implementation receives every [`Event`] the group publishes,
//! from `RunStarting` through the final `AllStoppedWithin` or `ShutdownTimedOut`.
//! Subscribers are attached with
//! [`GroupBuilder::with_subscribers`](crate::GroupBuilder::with_subscribers) and
//! live as long as the group: the listener that feeds them starts at `build()` and
//! is closed at the end of [`Stopping::shutdown`](crate::Stopping::shutdown), which
//! returns only after each subscriber has handled the events of the cycle.
//!
//! Delivery:
//! - one worker task and one bounded queue per subscriber, events in publish order;
//! - a full queue drops the event for that subscriber only (`SubscriberOverflow`);
//! - a panic in `on_event` is reported as `SubscriberPanicked` and the worker
//!   moves on to the next event.
//!
//! Because `shutdown` waits for the queues to drain, an `on_event` that never
//! returns holds up `shutdown` as well.
//!
//! ```rust
//! use async_trait::async_trait;
//! use rungroup::{Event, EventKind, Subscribe};
//!
//! struct Alerts;
//!
//! #[async_trait]
//! impl Subscribe for Alerts {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ShutdownTimedOut {
//!             eprintln!("abandoned: {}", ev.reason.as_deref().unwrap_or("-"));
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "alerts"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receives group events on its own worker task.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Runs off the control path; keep it short and non-blocking.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow`/`SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity for this subscriber, at least 1.
    ///
    /// One cycle of a group with `n` runners publishes roughly `3n + 5` events, so
    /// the default of 1024 only overflows for very large groups or stalled subscribers.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
