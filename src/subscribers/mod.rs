//! # Event subscribers for the group runtime.
//!
//! This module provides the [`Subscribe`] trait, the fan-out [`SubscriberSet`]
//! and, with the `logging` feature, the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Group control path ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                                 ├──► [queue] ─► LogWriter
//!                                                                 └──► [queue] ─► custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
