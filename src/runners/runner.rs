//! # Runner record: one task paired with its optional shutdown handler.

use std::sync::Arc;

use crate::runners::{shutdown::ShutdownRef, task::TaskRef};

/// Pairing of a [`Task`](crate::Task) and its optional [`ShutdownHandler`](crate::ShutdownHandler).
///
/// Immutable once registered; owned by the group that registered it.
#[derive(Clone)]
pub struct Runner {
    name: Arc<str>,
    task: TaskRef,
    shutdown: Option<ShutdownRef>,
}

impl Runner {
    /// Creates a runner named after its task.
    pub fn new(task: TaskRef, shutdown: Option<ShutdownRef>) -> Self {
        Self {
            name: Arc::from(task.name()),
            task,
            shutdown,
        }
    }

    /// Runner name (the task's name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// The task run during the run phase.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    /// The handler run during the shutdown phase, if any.
    pub fn shutdown(&self) -> Option<&ShutdownRef> {
        self.shutdown.as_ref()
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("name", &self.name)
            .field("has_shutdown", &self.shutdown.is_some())
            .finish()
    }
}
