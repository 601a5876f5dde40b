//! # Runner building blocks.
//!
//! - [`Task`] / [`TaskFn`] / [`TaskRef`] - the long-lived run function
//! - [`ShutdownHandler`] / [`ShutdownFn`] / [`ShutdownRef`] - the stop function
//! - [`Deadline`] - deadline-bearing cancellation given to shutdown handlers
//! - [`Runner`] - one task paired with its optional handler

mod deadline;
mod runner;
mod shutdown;
mod task;

pub use deadline::Deadline;
pub use runner::Runner;
pub use shutdown::{ShutdownFn, ShutdownHandler, ShutdownRef};
pub use task::{Task, TaskFn, TaskRef};
