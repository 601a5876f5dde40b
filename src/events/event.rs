//! # Events emitted by the group while it runs and shuts down.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run phase**: tasks starting, stopping, failing, and the trigger that ended the phase
//! - **Shutdown phase**: handlers reporting, and whether the budget held
//! - **Subscriber events**: overflow and panics of subscriber workers
//!
//! The [`Event`] struct carries metadata such as the runner name, a reason and
//! timing information.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use rungroup::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_runner("api")
//!     .with_reason("bind failed");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.runner.as_deref(), Some("api"));
//! assert_eq!(ev.reason.as_deref(), Some("bind failed"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of group events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `runner`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `runner`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Run phase ===
    /// Run phase is starting.
    ///
    /// Sets:
    /// - `count`: number of runners
    RunStarting,

    /// A task was spawned.
    ///
    /// Sets:
    /// - `runner`: runner name
    TaskStarted,

    /// A task returned `Ok` while the run phase was still waiting.
    ///
    /// Sets:
    /// - `runner`: runner name
    TaskStopped,

    /// A task returned an error while the run phase was still waiting.
    ///
    /// Sets:
    /// - `runner`: runner name
    /// - `reason`: error message
    TaskFailed,

    /// OS signal listeners could not be registered; only the parent token and task
    /// failures can end the run phase.
    ///
    /// Sets:
    /// - `reason`: registration error
    SignalsUnavailable,

    /// The run phase returned.
    ///
    /// Sets:
    /// - `trigger`: what ended it
    /// - `count`: number of run errors retained
    RunEnded,

    // === Shutdown phase ===
    /// Shutdown phase is starting.
    ///
    /// Sets:
    /// - `count`: number of shutdown handlers
    /// - `timeout_ms`: effective shutdown budget
    ShutdownStarting,

    /// A shutdown handler returned `Ok`.
    ///
    /// Sets:
    /// - `runner`: runner name
    /// - `elapsed_ms`: time since the shutdown phase started
    HandlerStopped,

    /// A shutdown handler returned an error.
    ///
    /// Sets:
    /// - `runner`: runner name
    /// - `reason`: error message
    /// - `elapsed_ms`: time since the shutdown phase started
    HandlerFailed,

    /// Every shutdown handler reported within the budget.
    ///
    /// Sets:
    /// - `elapsed_ms`: time since the shutdown phase started
    AllStoppedWithin,

    /// The shutdown budget elapsed; remaining handlers were abandoned.
    ///
    /// Sets:
    /// - `timeout_ms`: effective shutdown budget
    /// - `count`: number of abandoned handlers
    /// - `reason`: comma-separated names of abandoned runners
    ShutdownTimedOut,
}

/// What ended the run phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A task returned an error.
    TaskFailed,
    /// The caller's parent token was cancelled.
    Parent,
    /// The process received SIGINT/SIGTERM (Ctrl-C elsewhere).
    Signal,
}

/// Group event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the runner (or subscriber), if applicable.
    pub runner: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, abandoned runners).
    pub reason: Option<Arc<str>>,
    /// Shutdown budget in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Time since the phase started, in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Number of runners or handlers involved.
    pub count: Option<u32>,
    /// Trigger that ended the run phase.
    pub trigger: Option<Trigger>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            runner: None,
            reason: None,
            timeout_ms: None,
            elapsed_ms: None,
            count: None,
            trigger: None,
        }
    }

    /// Attaches a runner name.
    #[inline]
    pub fn with_runner(mut self, runner: impl Into<Arc<str>>) -> Self {
        self.runner = Some(runner.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a budget (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Attaches the trigger that ended the run phase.
    #[inline]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_runner(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_runner(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub(crate) fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}
