//! Runtime core: registration, run phase and shutdown phase.
//!
//! The public types from this module are [`GroupBuilder`], [`Group`], [`Stopping`]
//! and the configuration in [`Config`].
//!
//! Internal modules:
//! - [`builder`]: collects runners and freezes them into a [`Group`];
//! - [`group`]: run phase, subscriber listener;
//! - [`stopping`]: shutdown phase with the outer/inner deadlines;
//! - [`signals`]: scoped SIGINT/SIGTERM interception;
//! - [`config`]: budgets, margins and error retention.

mod builder;
mod config;
mod group;
mod signals;
mod stopping;

pub use builder::GroupBuilder;
pub use config::{Config, MIN_SHUTDOWN_BUDGET, RunErrorMode};
pub use group::Group;
pub use stopping::Stopping;
