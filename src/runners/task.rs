//! # Task abstraction and function-backed task implementation.
//!
//! This module defines the [`Task`] trait (async, cancelable) and a convenient
//! function-backed implementation [`TaskFn`]. The common handle type is [`TaskRef`],
//! an `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! A task receives the run-phase [`CancellationToken`] and should watch it to stop
//! cooperatively. The group never aborts a running task.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;

/// # Shared handle to a task object.
pub type TaskRef = Arc<dyn Task>;

/// # Long-lived, cancelable unit of work.
///
/// A `Task` represents one service's main loop (a listener, a consumer, a metrics
/// endpoint). Returning `Err` ends the run phase of the whole group.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use rungroup::{BoxError, Task};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Task for Ticker {
///     fn name(&self) -> &str { "ticker" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
///         ctx.cancelled().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Runs until completion, failure or cancellation of `ctx`.
    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError>;
}

/// # Function-backed task.
///
/// Wraps a closure `F: Fn(CancellationToken) -> Fut`. The group calls it once per
/// run phase; shared state goes into an explicit `Arc<...>` captured by the closure.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use rungroup::{BoxError, TaskFn, TaskRef};
///
/// let t: TaskRef = TaskFn::arc("worker", |ctx: CancellationToken| async move {
///     ctx.cancelled().await;
///     Ok::<_, BoxError>(())
/// });
/// assert_eq!(t.name(), "worker");
/// ```
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), BoxError> {
        (self.f)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_fn_forwards_token_and_result() {
        let t: TaskRef = TaskFn::arc("fails-when-cancelled", |ctx: CancellationToken| async move {
            if ctx.is_cancelled() {
                return Err::<(), BoxError>("cancelled".into());
            }
            Ok(())
        });

        assert!(t.run(CancellationToken::new()).await.is_ok());

        let token = CancellationToken::new();
        token.cancel();
        let err = t.run(token).await.unwrap_err();
        assert_eq!(err.to_string(), "cancelled");
        assert_eq!(t.name(), "fails-when-cancelled");
    }
}
