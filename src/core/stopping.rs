//! # Stopping: bounded-time shutdown of a group whose run phase has ended.
//!
//! ```text
//! Stopping::shutdown():
//!   outer = sleep(budget)                    budget   = Config::shutdown_budget()   (>= 2s)
//!   deadline = Deadline::after(handler)      handler  = Config::handler_budget()    (budget - margin)
//!
//!   for each runner with a handler (k of them):
//!       tokio::spawn(handler.shutdown(deadline)) ──► results: mpsc(k)
//!
//!   loop until k results or outer fires:
//!     ├─ Ok  ─► HandlerStopped
//!     └─ Err ─► HandlerFailed, keep error
//!   outer fired ─► ShutdownTimedOut, keep "shutdown timeout exceeded", abandon the rest
//! ```
//!
//! Abandoned handlers are not aborted; see [`ShutdownHandler`](crate::ShutdownHandler).
//! Before returning, `shutdown` waits until every subscriber has processed the
//! events of the cycle, including the final `AllStoppedWithin`/`ShutdownTimedOut`.
//! A handler that panics never reports, so it is counted as pending until the
//! budget runs out.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{config::Config, group::ListenerGuard};
use crate::{
    error::{BoxError, GroupError, RunnerError},
    events::{Bus, Event, EventKind, Trigger},
    runners::{Deadline, Runner, ShutdownRef},
};

/// Result delivered by one spawned handler, tagged with its slot.
type Report = (usize, Result<(), BoxError>);

/// A group whose run phase has ended and whose shutdown phase is pending.
///
/// Produced by [`Group::wait`](crate::Group::wait). [`Stopping::shutdown`] consumes it,
/// so each phase runs at most once.
pub struct Stopping {
    cfg: Config,
    runners: Vec<Runner>,
    bus: Bus,
    listener: ListenerGuard,
    trigger: Trigger,
    run_errors: Option<GroupError>,
}

impl Stopping {
    pub(super) fn new(
        cfg: Config,
        runners: Vec<Runner>,
        bus: Bus,
        listener: ListenerGuard,
        trigger: Trigger,
        run_errors: Option<GroupError>,
    ) -> Self {
        Self {
            cfg,
            runners,
            bus,
            listener,
            trigger,
            run_errors,
        }
    }

    /// Errors collected by the run phase, wrapped like shutdown errors.
    ///
    /// With [`RunErrorMode::FirstOnly`](crate::RunErrorMode::FirstOnly) this holds at
    /// most one error: the first task failure observed.
    pub fn errors(&self) -> Option<&GroupError> {
        self.run_errors.as_ref()
    }

    /// Takes the run-phase errors out, leaving `None` behind.
    pub fn take_errors(&mut self) -> Option<GroupError> {
        self.run_errors.take()
    }

    /// What ended the run phase.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Registered runners, in registration order.
    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    /// Shutdown phase: runs every shutdown handler concurrently within the budget.
    ///
    /// Returns `Ok(())` if every handler reported success in time. Otherwise returns
    /// a [`GroupError`] holding the timeout error (first, if the budget ran out)
    /// followed by handler errors in completion order.
    pub async fn shutdown(self) -> Result<(), GroupError> {
        let budget = self.cfg.shutdown_budget();
        let started = Instant::now();
        let outer = tokio::time::sleep(budget);
        tokio::pin!(outer);

        let handlers: Vec<(Arc<str>, ShutdownRef)> = self
            .runners
            .iter()
            .filter_map(|r| r.shutdown().map(|h| (r.name_arc(), Arc::clone(h))))
            .collect();
        let expected = handlers.len();

        self.bus.publish(
            Event::new(EventKind::ShutdownStarting)
                .with_count(expected)
                .with_timeout(budget),
        );

        let mut reports = self.spawn_handlers(&handlers);
        let mut reported = vec![false; expected];
        let mut received = 0;
        let mut errors = Vec::new();

        let timed_out = loop {
            if received == expected {
                break false;
            }
            tokio::select! {
                biased;
                Some((slot, res)) = reports.recv() => {
                    received += 1;
                    reported[slot] = true;
                    let name = Arc::clone(&handlers[slot].0);
                    match res {
                        Ok(()) => self.bus.publish(
                            Event::new(EventKind::HandlerStopped)
                                .with_runner(name)
                                .with_elapsed(started.elapsed()),
                        ),
                        Err(source) => {
                            self.bus.publish(
                                Event::new(EventKind::HandlerFailed)
                                    .with_runner(Arc::clone(&name))
                                    .with_reason(source.to_string())
                                    .with_elapsed(started.elapsed()),
                            );
                            errors.push(RunnerError::Shutdown { runner: name, source });
                        }
                    }
                }
                _ = &mut outer => break true,
            }
        };

        if timed_out {
            let pending: Vec<Arc<str>> = handlers
                .iter()
                .zip(&reported)
                .filter(|(_, done)| !**done)
                .map(|((name, _), _)| Arc::clone(name))
                .collect();
            self.bus.publish(
                Event::new(EventKind::ShutdownTimedOut)
                    .with_timeout(budget)
                    .with_count(pending.len())
                    .with_reason(pending.join(",")),
            );
            errors.insert(0, RunnerError::ShutdownTimeout { budget, pending });
        } else {
            self.bus.publish(
                Event::new(EventKind::AllStoppedWithin).with_elapsed(started.elapsed()),
            );
        }

        // Subscribers see the final events before the caller gets the result.
        self.listener.close().await;

        match GroupError::from_errors(errors) {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Spawns every handler with one shared deadline; results go to a channel sized to `k`.
    fn spawn_handlers(&self, handlers: &[(Arc<str>, ShutdownRef)]) -> mpsc::Receiver<Report> {
        let (tx, rx) = mpsc::channel::<Report>(handlers.len().max(1));
        if handlers.is_empty() {
            return rx;
        }

        let deadline = Deadline::after(self.cfg.handler_budget());
        for (slot, (_, handler)) in handlers.iter().enumerate() {
            let handler = Arc::clone(handler);
            let deadline = deadline.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let res = handler.shutdown(deadline).await;
                let _ = tx.send((slot, res)).await;
            });
        }
        rx
    }
}

impl std::fmt::Debug for Stopping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopping")
            .field("trigger", &self.trigger)
            .field("runners", &self.runners)
            .field("run_errors", &self.run_errors)
            .finish_non_exhaustive()
    }
}
