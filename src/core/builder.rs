use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{config::Config, group::Group};
use crate::{
    error::BoxError,
    runners::{Deadline, Runner, ShutdownFn, ShutdownRef, TaskFn, TaskRef},
    subscribers::Subscribe,
};

/// Builder that collects runners before the group starts.
///
/// Registration is only possible here; [`GroupBuilder::build`] freezes the runner
/// list into an immutable [`Group`].
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use rungroup::{BoxError, Config, Deadline, Group};
///
/// let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(5)))
///     .register_fn(
///         "api",
///         |ctx: CancellationToken| async move {
///             ctx.cancelled().await;
///             Ok::<_, BoxError>(())
///         },
///         |_deadline: Deadline| async { Ok::<_, BoxError>(()) },
///     )
///     .build();
/// assert_eq!(group.runners().len(), 1);
/// ```
pub struct GroupBuilder {
    cfg: Config,
    runners: Vec<Runner>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl GroupBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            runners: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    /// Registers a task and its optional shutdown handler.
    ///
    /// No validation is performed; `None` means nothing to do at shutdown.
    pub fn register(mut self, task: TaskRef, shutdown: Option<ShutdownRef>) -> Self {
        self.runners.push(Runner::new(task, shutdown));
        self
    }

    /// Registers a task with no shutdown handler.
    pub fn register_task(self, task: TaskRef) -> Self {
        self.register(task, None)
    }

    /// Registers a pair of closures as a named runner.
    pub fn register_fn<R, RFut, S, SFut>(
        self,
        name: impl Into<Cow<'static, str>>,
        run: R,
        shutdown: S,
    ) -> Self
    where
        R: Fn(CancellationToken) -> RFut + Send + Sync + 'static,
        RFut: Future<Output = Result<(), BoxError>> + Send + 'static,
        S: Fn(Deadline) -> SFut + Send + Sync + 'static,
        SFut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let task: TaskRef = TaskFn::arc(name, run);
        let handler: ShutdownRef = ShutdownFn::arc(shutdown);
        self.register(task, Some(handler))
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive group events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the group.
    ///
    /// With subscribers attached this spawns their workers, so it must then be
    /// called inside a tokio runtime.
    pub fn build(self) -> Group {
        Group::new_internal(self.cfg, self.runners, self.subscribers)
    }
}

impl std::fmt::Debug for GroupBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupBuilder")
            .field("cfg", &self.cfg)
            .field("runners", &self.runners)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
