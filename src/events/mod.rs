//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the group's control path and the
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Group::wait` (run phase), `Stopping::shutdown` (shutdown phase),
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the group's subscriber listener (fans out to `SubscriberSet`),
//!   plus any receiver obtained from `Group::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Trigger};
