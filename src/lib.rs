//! # rungroup
//!
//! **rungroup** runs a fixed set of long-lived async tasks side by side, waits for
//! the first reason to stop, and then shuts all of them down within a bounded budget.
//!
//! It is meant for service binaries that host several peers in one process
//! (an HTTP listener, a gRPC listener, a metrics endpoint, a queue consumer) and
//! need one place that decides when to stop and how long stopping may take.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Runner    │   │    Runner    │   │    Runner    │
//!     │ task + (stop)│   │ task + (stop)│   │ task only    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  GroupBuilder::register(..) ──► build() ──► Group (frozen)        │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Group::wait(parent)            run phase                         │
//! │  - one tokio task per runner: task.run(run_token)                 │
//! │  - returns on first Err, parent cancel, or SIGINT/SIGTERM         │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Stopping::shutdown()           shutdown phase                    │
//! │  - one tokio task per handler: handler.shutdown(deadline)         │
//! │  - waits at most Config::shutdown_budget() (>= 2s)                │
//! │  - Err(GroupError) on handler errors or "shutdown timeout exceeded"│
//! └───────────────────────────────────────────────────────────────────┘
//!
//! Both phases publish Events ──► Bus ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! GroupBuilder ──build()──► Group ──wait()──► Stopping ──shutdown()──► Result
//! ```
//! Each step consumes the previous value, so a phase cannot run twice.
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Runners**       | Tasks and shutdown handlers, as traits or closures.            | [`Task`], [`TaskFn`], [`ShutdownHandler`], [`ShutdownFn`] |
//! | **Orchestration** | Run phase and bounded shutdown phase.                          | [`Group`], [`GroupBuilder`], [`Stopping`]   |
//! | **Errors**        | Per-runner errors and their aggregate.                         | [`RunnerError`], [`GroupError`]             |
//! | **Configuration** | Shutdown budget, handler margin, error retention.              | [`Config`], [`RunErrorMode`]                |
//! | **Subscriber API**| Observe run/shutdown events.                                   | [`Subscribe`], [`Event`], [`EventKind`]     |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], a subscriber that writes `tracing` records.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use rungroup::{BoxError, Config, Deadline, Group};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(5)))
//!         .register_fn(
//!             "ticker",
//!             |ctx: CancellationToken| async move {
//!                 while !ctx.is_cancelled() {
//!                     tokio::time::sleep(Duration::from_millis(10)).await;
//!                 }
//!                 Ok::<_, BoxError>(())
//!             },
//!             |_deadline: Deadline| async { Ok::<_, BoxError>(()) },
//!         )
//!         .build();
//!
//!     // Stands in for Ctrl-C.
//!     let parent = CancellationToken::new();
//!     parent.cancel();
//!
//!     let stopping = group.wait(parent).await;
//!     if let Some(err) = stopping.errors() {
//!         eprintln!("run phase failed: {err}");
//!     }
//!     stopping.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod runners;
mod subscribers;

// ---- Public re-exports ----

pub use self::core::{Config, Group, GroupBuilder, MIN_SHUTDOWN_BUDGET, RunErrorMode, Stopping};
pub use error::{BoxError, GroupError, RunnerError, SHUTDOWN_TIMEOUT_MSG};
pub use events::{Bus, Event, EventKind, Trigger};
pub use runners::{
    Deadline, Runner, ShutdownFn, ShutdownHandler, ShutdownRef, Task, TaskFn, TaskRef,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in subscriber that logs through `tracing`.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
