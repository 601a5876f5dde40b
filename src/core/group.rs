//! # Group: runs the registered tasks until the first termination trigger.
//!
//! The [`Group`] owns the frozen runner list, the event bus and the subscriber
//! listener. [`Group::wait`] is the run phase; it consumes the group and hands back
//! a [`Stopping`] that drives the shutdown phase.
//!
//! ## High-level architecture
//! ```text
//! GroupBuilder::register(..)* ──► build() ──► Group
//!
//! Group::wait(parent):
//!   run_token = parent.child_token()
//!   SignalScope::install()                      (SIGINT/SIGTERM listener, dropped on return)
//!   Runner[0]  Runner[1]  ...  Runner[N-1]
//!       │          │                │
//!       └──► tokio::spawn(task.run(run_token)) ──► results: mpsc(N)
//!
//!   select! (control path only):
//!     ├─ Err result          ─► keep error, Trigger::TaskFailed
//!     ├─ run_token.cancelled ─► Trigger::Parent
//!     └─ scope.fired()       ─► Trigger::Signal
//!
//!   run_token.cancel()   → tasks still running see cooperative cancellation
//!   └─► Stopping { run_errors }
//! ```
//!
//! ## Rules
//! - Results are accumulated only here, never inside spawned tasks.
//! - `Ok` results do not end the phase; a group whose tasks all finish cleanly
//!   keeps waiting for the parent token or a signal.
//! - Tasks are never aborted. The results channel is sized to the number of runners,
//!   so late tasks never block on delivery.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    builder::GroupBuilder,
    config::{Config, RunErrorMode},
    signals::SignalScope,
    stopping::Stopping,
};
use crate::{
    error::{BoxError, GroupError, RunnerError},
    events::{Bus, Event, EventKind, Trigger},
    runners::Runner,
    subscribers::{Subscribe, SubscriberSet},
};

/// Result delivered by one spawned task.
type Outcome = (Arc<str>, Result<(), BoxError>);

/// A frozen set of runners, ready for the run phase.
pub struct Group {
    cfg: Config,
    runners: Vec<Runner>,
    bus: Bus,
    listener: ListenerGuard,
}

impl Group {
    /// Starts building a group with the given configuration.
    pub fn builder(cfg: Config) -> GroupBuilder {
        GroupBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        runners: Vec<Runner>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let listener = ListenerGuard::spawn(&bus, subscribers);
        Self {
            cfg,
            runners,
            bus,
            listener,
        }
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Registered runners, in registration order.
    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    /// Creates a raw receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Run phase: starts every task and returns on the first termination trigger.
    ///
    /// Returns when one of the following happens first:
    /// 1. a task returns an error;
    /// 2. `parent` is cancelled;
    /// 3. the process receives SIGINT or SIGTERM (Ctrl-C on non-Unix).
    ///
    /// Tasks receive a child of `parent` that is cancelled when this phase returns.
    /// Tasks that are still running are left alone; stopping them is the job of
    /// their shutdown handlers and of their own cancellation handling.
    pub async fn wait(self, parent: CancellationToken) -> Stopping {
        let run_token = parent.child_token();
        let signals = match SignalScope::install() {
            Ok(scope) => Some(scope),
            Err(e) => {
                self.bus
                    .publish(Event::new(EventKind::SignalsUnavailable).with_reason(e.to_string()));
                None
            }
        };

        let mut results = self.spawn_tasks(&run_token);
        let (trigger, mut errors) = self
            .first_trigger(&mut results, &run_token, signals.as_ref())
            .await;
        drop(signals);
        run_token.cancel();

        if self.cfg.run_errors == RunErrorMode::CollectReady {
            errors.extend(self.drain_ready(&mut results));
        }

        self.bus.publish(
            Event::new(EventKind::RunEnded)
                .with_trigger(trigger)
                .with_count(errors.len()),
        );

        Stopping::new(
            self.cfg,
            self.runners,
            self.bus,
            self.listener,
            trigger,
            GroupError::from_errors(errors),
        )
    }

    /// Spawns one task per runner; results go to a channel sized to the runner count.
    fn spawn_tasks(&self, run_token: &CancellationToken) -> mpsc::Receiver<Outcome> {
        let (tx, rx) = mpsc::channel::<Outcome>(self.runners.len().max(1));
        self.bus
            .publish(Event::new(EventKind::RunStarting).with_count(self.runners.len()));

        for runner in &self.runners {
            let task = Arc::clone(runner.task());
            let name = runner.name_arc();
            let ctx = run_token.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let res = task.run(ctx).await;
                let _ = tx.send((name, res)).await;
            });
            self.bus
                .publish(Event::new(EventKind::TaskStarted).with_runner(runner.name()));
        }
        rx
    }

    /// Waits for the first failing task or cancellation, whichever comes first.
    async fn first_trigger(
        &self,
        results: &mut mpsc::Receiver<Outcome>,
        run_token: &CancellationToken,
        signals: Option<&SignalScope>,
    ) -> (Trigger, Vec<RunnerError>) {
        let mut drained = false;
        loop {
            tokio::select! {
                biased;
                msg = results.recv(), if !drained => match msg {
                    Some((name, Ok(()))) => {
                        self.bus.publish(Event::new(EventKind::TaskStopped).with_runner(name));
                    }
                    Some((name, Err(source))) => {
                        self.publish_failed(&name, &source);
                        let err = RunnerError::Task { runner: name, source };
                        return (Trigger::TaskFailed, vec![err]);
                    }
                    // Every task has finished (or panicked) without an error.
                    None => drained = true,
                },
                _ = run_token.cancelled() => return (Trigger::Parent, Vec::new()),
                _ = signalled(signals) => return (Trigger::Signal, Vec::new()),
            }
        }
    }

    /// Collects errors already queued when the phase returned.
    fn drain_ready(&self, results: &mut mpsc::Receiver<Outcome>) -> Vec<RunnerError> {
        let mut errors = Vec::new();
        while let Ok((name, res)) = results.try_recv() {
            match res {
                Ok(()) => {
                    self.bus
                        .publish(Event::new(EventKind::TaskStopped).with_runner(name));
                }
                Err(source) => {
                    self.publish_failed(&name, &source);
                    errors.push(RunnerError::Task {
                        runner: name,
                        source,
                    });
                }
            }
        }
        errors
    }

    fn publish_failed(&self, name: &Arc<str>, err: &BoxError) {
        self.bus.publish(
            Event::new(EventKind::TaskFailed)
                .with_runner(Arc::clone(name))
                .with_reason(err.to_string()),
        );
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("cfg", &self.cfg)
            .field("runners", &self.runners)
            .finish_non_exhaustive()
    }
}

async fn signalled(scope: Option<&SignalScope>) {
    match scope {
        Some(scope) => scope.fired().await,
        None => std::future::pending().await,
    }
}

/// Forwards bus events to the subscriber set until closed or dropped.
///
/// [`ListenerGuard::close`] stops the listener after it has forwarded every event
/// already on the bus and waits until the subscribers have processed them.
/// Dropping the guard stops it the same way without waiting.
pub(super) struct ListenerGuard {
    inner: Option<(CancellationToken, JoinHandle<()>)>,
}

impl ListenerGuard {
    fn spawn(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        if subscribers.is_empty() {
            return Self { inner: None };
        }

        let set = SubscriberSet::new(subscribers, bus.clone());
        let mut rx = bus.subscribe();
        let stop = CancellationToken::new();
        let stopped = stop.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = stopped.cancelled() => break,
                }
            }
            set.shutdown().await;
        });

        Self {
            inner: Some((stop, handle)),
        }
    }

    /// Stops the listener and waits for the subscribers to drain.
    pub(super) async fn close(mut self) {
        if let Some((stop, handle)) = self.inner.take() {
            stop.cancel();
            let _ = handle.await;
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some((stop, _)) = &self.inner {
            stop.cancel();
        }
    }
}
