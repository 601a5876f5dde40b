//! # Shutdown handlers.
//!
//! A [`ShutdownHandler`] releases one runner's resources during the shutdown phase.
//! It receives a [`Deadline`] that fires a little before the group stops waiting,
//! so a handler that honours it can still report its own outcome.
//!
//! ## Abandonment contract
//! When the shutdown budget runs out, handlers that have not reported are
//! **abandoned**: the group stops waiting but does not abort them. Their futures
//! keep running on the runtime until they finish or the runtime is dropped.
//! Handlers must therefore be idempotent and safe to leave mid-flight.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::runners::deadline::Deadline;

/// # Shared handle to a shutdown handler.
pub type ShutdownRef = Arc<dyn ShutdownHandler>;

/// # Releases a runner's resources within a deadline.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use rungroup::{BoxError, Deadline, ShutdownHandler};
///
/// struct Flush;
///
/// #[async_trait]
/// impl ShutdownHandler for Flush {
///     async fn shutdown(&self, deadline: Deadline) -> Result<(), BoxError> {
///         tokio::select! {
///             _ = deadline.cancelled() => Err("flush interrupted".into()),
///             _ = async { /* flush buffers */ } => Ok(()),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait ShutdownHandler: Send + Sync + 'static {
    /// Stops the runner, honouring `deadline` where possible.
    async fn shutdown(&self, deadline: Deadline) -> Result<(), BoxError>;
}

/// # Function-backed shutdown handler.
///
/// Wraps a closure `F: Fn(Deadline) -> Fut`.
///
/// ```rust
/// use rungroup::{BoxError, Deadline, ShutdownFn, ShutdownRef};
///
/// let h: ShutdownRef = ShutdownFn::arc(|_deadline: Deadline| async { Ok::<_, BoxError>(()) });
/// ```
pub struct ShutdownFn<F> {
    f: F,
}

impl<F> ShutdownFn<F> {
    /// Creates a new function-backed handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> ShutdownHandler for ShutdownFn<F>
where
    F: Fn(Deadline) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn shutdown(&self, deadline: Deadline) -> Result<(), BoxError> {
        (self.f)(deadline).await
    }
}

impl<F> std::fmt::Debug for ShutdownFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownFn").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_fn_sees_deadline() {
        let h: ShutdownRef = ShutdownFn::arc(|deadline: Deadline| async move {
            deadline.cancelled().await;
            Err::<(), BoxError>("deadline reached".into())
        });

        let err = h
            .shutdown(Deadline::after(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "deadline reached");
    }
}
