//! # Group configuration.
//!
//! Provides [`Config`] centralized settings for one run/shutdown cycle.
//!
//! ## Clamping
//! - `shutdown_budget` below [`MIN_SHUTDOWN_BUDGET`] is raised to it
//! - `handler_margin` that would leave no time for handlers falls back to half the budget
//! - `bus_capacity = 0` is treated as 1

use std::time::Duration;

/// Smallest effective shutdown budget.
pub const MIN_SHUTDOWN_BUDGET: Duration = Duration::from_secs(2);

/// Which run-phase errors the group keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunErrorMode {
    /// Keep only the first error observed (fail fast). Errors from tasks that
    /// fail concurrently or later are dropped.
    #[default]
    FirstOnly,
    /// Keep the first error plus every error already queued when the run phase
    /// returns. Tasks that fail after that are still not observed.
    CollectReady,
}

/// Configuration for a [`Group`](crate::Group).
///
/// ## Field semantics
/// - `shutdown_budget`: total wall-clock time for the shutdown phase (floor: 2s)
/// - `handler_margin`: how much earlier than the budget handlers see their deadline
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `run_errors`: which run-phase errors are retained
///
/// Prefer the accessors over reading `shutdown_budget`/`handler_margin` directly;
/// they apply the clamping rules.
#[derive(Clone, Debug)]
pub struct Config {
    /// Requested shutdown budget; see [`Config::shutdown_budget`].
    pub shutdown_budget: Duration,

    /// Gap between the handlers' deadline and the group's own deadline.
    ///
    /// Gives handlers that honour their deadline time to report before the group
    /// stops waiting.
    pub handler_margin: Duration,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Run-phase error retention.
    pub run_errors: RunErrorMode,
}

impl Config {
    /// Default config with the given requested shutdown budget.
    pub fn with_shutdown_budget(budget: Duration) -> Self {
        Self {
            shutdown_budget: budget,
            ..Self::default()
        }
    }

    /// Effective shutdown budget, never below [`MIN_SHUTDOWN_BUDGET`].
    #[inline]
    pub fn shutdown_budget(&self) -> Duration {
        self.shutdown_budget.max(MIN_SHUTDOWN_BUDGET)
    }

    /// Deadline handed to shutdown handlers: budget minus margin.
    ///
    /// Always positive; if the margin swallows the whole budget, half the budget is used.
    #[inline]
    pub fn handler_budget(&self) -> Duration {
        let budget = self.shutdown_budget();
        match budget.checked_sub(self.handler_margin) {
            Some(d) if d > Duration::ZERO => d,
            _ => budget / 2,
        }
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `shutdown_budget = 30s`
    /// - `handler_margin = 1s`
    /// - `bus_capacity = 1024`
    /// - `run_errors = RunErrorMode::FirstOnly`
    fn default() -> Self {
        Self {
            shutdown_budget: Duration::from_secs(30),
            handler_margin: Duration::from_secs(1),
            bus_capacity: 1024,
            run_errors: RunErrorMode::FirstOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_below_floor_is_raised() {
        let cfg = Config::with_shutdown_budget(Duration::from_millis(500));
        assert_eq!(cfg.shutdown_budget(), Duration::from_secs(2));
    }

    #[test]
    fn test_budget_above_floor_is_kept() {
        let cfg = Config::with_shutdown_budget(Duration::from_secs(3));
        assert_eq!(cfg.shutdown_budget(), Duration::from_secs(3));
        assert_eq!(cfg.handler_budget(), Duration::from_secs(2));
    }

    #[test]
    fn test_handler_budget_at_floor() {
        let cfg = Config::with_shutdown_budget(Duration::ZERO);
        assert_eq!(cfg.handler_budget(), Duration::from_secs(1));
    }

    #[test]
    fn test_oversized_margin_falls_back_to_half() {
        let cfg = Config {
            handler_margin: Duration::from_secs(10),
            ..Config::with_shutdown_budget(Duration::from_secs(4))
        };
        assert_eq!(cfg.handler_budget(), Duration::from_secs(2));

        let exact = Config {
            handler_margin: Duration::from_secs(4),
            ..Config::with_shutdown_budget(Duration::from_secs(4))
        };
        assert_eq!(exact.handler_budget(), Duration::from_secs(2));
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.shutdown_budget(), Duration::from_secs(30));
        assert_eq!(cfg.run_errors, RunErrorMode::FirstOnly);
        assert_eq!(Config { bus_capacity: 0, ..cfg }.bus_capacity_clamped(), 1);
    }
}
