//! Error types used by the group runtime and its runners.
//!
//! This module defines:
//!
//! - [`BoxError`]: the error type returned by user tasks and shutdown handlers.
//! - [`RunnerError`]: one failure observed by the group (task, handler or timeout).
//! - [`GroupError`]: an aggregate of [`RunnerError`]s with a deterministic message.
//!
//! [`RunnerError`] provides `as_label` for logging/metrics, mirroring the
//! labels attached to [`Event`](crate::Event)s.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Error returned by user-supplied tasks and shutdown handlers.
///
/// Any `std::error::Error + Send + Sync` converts into it with `?` or `.into()`,
/// and so does `anyhow::Error` via `Into<Box<dyn Error + Send + Sync>>`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message carried by [`RunnerError::ShutdownTimeout`].
pub const SHUTDOWN_TIMEOUT_MSG: &str = "shutdown timeout exceeded";

/// # A single failure observed by the group.
///
/// The `Display` output of `Task` and `Shutdown` is the underlying error's message,
/// so an aggregated [`GroupError`] reads the same as the errors the runners returned.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A registered task's run function returned an error.
    #[error("{source}")]
    Task {
        /// Name of the runner whose task failed.
        runner: Arc<str>,
        /// Error returned by the task.
        source: BoxError,
    },

    /// A registered shutdown handler returned an error.
    #[error("{source}")]
    Shutdown {
        /// Name of the runner whose handler failed.
        runner: Arc<str>,
        /// Error returned by the handler.
        source: BoxError,
    },

    /// The shutdown budget elapsed before every handler reported.
    #[error("shutdown timeout exceeded")]
    ShutdownTimeout {
        /// Effective shutdown budget that was exceeded.
        budget: Duration,
        /// Runners whose handlers had not reported when the budget ran out.
        pending: Vec<Arc<str>>,
    },
}

impl RunnerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use rungroup::RunnerError;
    /// use std::time::Duration;
    ///
    /// let err = RunnerError::ShutdownTimeout { budget: Duration::from_secs(2), pending: vec![] };
    /// assert_eq!(err.as_label(), "shutdown_timeout");
    /// assert_eq!(err.to_string(), "shutdown timeout exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::Task { .. } => "task_failed",
            RunnerError::Shutdown { .. } => "shutdown_failed",
            RunnerError::ShutdownTimeout { .. } => "shutdown_timeout",
        }
    }

    /// Name of the runner this error belongs to; `None` for the synthetic timeout.
    pub fn runner(&self) -> Option<&str> {
        match self {
            RunnerError::Task { runner, .. } | RunnerError::Shutdown { runner, .. } => {
                Some(&**runner)
            }
            RunnerError::ShutdownTimeout { .. } => None,
        }
    }

    /// True for [`RunnerError::ShutdownTimeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunnerError::ShutdownTimeout { .. })
    }
}

/// # Several failures reported together.
///
/// Rendered as `multiple errors: (e1) (e2) ...`, in the order the group observed
/// the errors (completion order, not registration order).
///
/// # Example
/// ```
/// use rungroup::{GroupError, RunnerError};
///
/// let err = GroupError::new(vec![
///     RunnerError::Task { runner: "api".into(), source: "bind failed".into() },
///     RunnerError::Shutdown { runner: "db".into(), source: "pool busy".into() },
/// ]);
/// assert_eq!(err.to_string(), "multiple errors: (bind failed) (pool busy)");
/// ```
#[derive(Debug, Default)]
pub struct GroupError {
    errors: Vec<RunnerError>,
}

impl GroupError {
    /// Wraps the given errors.
    pub fn new(errors: Vec<RunnerError>) -> Self {
        Self { errors }
    }

    /// Wraps the errors, or returns `None` when there are none.
    pub(crate) fn from_errors(errors: Vec<RunnerError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Underlying errors, in observation order.
    pub fn errors(&self) -> &[RunnerError] {
        &self.errors
    }

    /// Consumes the aggregate and returns the underlying errors.
    pub fn into_errors(self) -> Vec<RunnerError> {
        self.errors
    }

    /// Number of wrapped errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True if no errors are wrapped.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True if the shutdown budget was exceeded.
    pub fn has_timeout(&self) -> bool {
        self.errors.iter().any(RunnerError::is_timeout)
    }
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("multiple errors:")?;
        for err in &self.errors {
            write!(f, " ({err})")?;
        }
        Ok(())
    }
}

impl std::error::Error for GroupError {}

impl IntoIterator for GroupError {
    type Item = RunnerError;
    type IntoIter = std::vec::IntoIter<RunnerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
