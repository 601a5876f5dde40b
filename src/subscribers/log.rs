//! # LogWriter: forwards group events to `tracing`
//!
//! A subscriber that turns each [`Event`] into one structured `tracing` record.
//! Failures and timeouts are logged at `WARN`, everything else at `INFO`/`DEBUG`.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO rungroup: run starting runners=2
//! WARN rungroup: task failed runner="api" err="bind failed"
//! INFO rungroup: shutdown starting handlers=2 budget_ms=3000
//! WARN rungroup: shutdown timed out budget_ms=3000 abandoned="db"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default, Debug)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let runner = e.runner.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::RunStarting => {
                tracing::info!(target: "rungroup", runners = e.count, "run starting");
            }
            EventKind::TaskStarted => {
                tracing::debug!(target: "rungroup", runner, "task started");
            }
            EventKind::TaskStopped => {
                tracing::info!(target: "rungroup", runner, "task stopped");
            }
            EventKind::TaskFailed => {
                tracing::warn!(target: "rungroup", runner, err = reason, "task failed");
            }
            EventKind::SignalsUnavailable => {
                tracing::warn!(
                    target: "rungroup",
                    err = reason,
                    "signal listeners unavailable"
                );
            }
            EventKind::RunEnded => {
                tracing::info!(
                    target: "rungroup",
                    trigger = ?e.trigger,
                    errors = e.count,
                    "run phase ended"
                );
            }
            EventKind::ShutdownStarting => {
                tracing::info!(
                    target: "rungroup",
                    handlers = e.count,
                    budget_ms = e.timeout_ms,
                    "shutdown starting"
                );
            }
            EventKind::HandlerStopped => {
                tracing::debug!(
                    target: "rungroup",
                    runner,
                    elapsed_ms = e.elapsed_ms,
                    "handler stopped"
                );
            }
            EventKind::HandlerFailed => {
                tracing::warn!(
                    target: "rungroup",
                    runner,
                    err = reason,
                    elapsed_ms = e.elapsed_ms,
                    "handler failed"
                );
            }
            EventKind::AllStoppedWithin => {
                tracing::info!(
                    target: "rungroup",
                    elapsed_ms = e.elapsed_ms,
                    "all handlers stopped within budget"
                );
            }
            EventKind::ShutdownTimedOut => {
                tracing::warn!(
                    target: "rungroup",
                    budget_ms = e.timeout_ms,
                    abandoned = reason,
                    "shutdown timed out"
                );
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    target: "rungroup",
                    subscriber = runner,
                    reason,
                    "subscriber dropped event"
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(
                    target: "rungroup",
                    subscriber = runner,
                    info = reason,
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
