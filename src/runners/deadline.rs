//! # Deadline-bearing cancellation passed to shutdown handlers.
//!
//! A [`Deadline`] pairs an absolute instant with a [`CancellationToken`] that is
//! cancelled once the instant passes. Handlers can either race their work against
//! [`Deadline::cancelled`] or bound individual steps with [`Deadline::remaining`].
//!
//! The token is cancelled by a timer task owned by the shutdown phase; a handler
//! that outlives the phase still sees the token fire.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Absolute deadline plus a token cancelled when it is reached.
#[derive(Clone, Debug)]
pub struct Deadline {
    at: Instant,
    token: CancellationToken,
}

impl Deadline {
    /// Creates a deadline `after` from now and spawns the timer that cancels its token.
    ///
    /// Must be called inside a tokio runtime.
    pub fn after(after: Duration) -> Self {
        let at = Instant::now() + after;
        let token = CancellationToken::new();

        let timer = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(at) => timer.cancel(),
                _ = timer.cancelled() => {}
            }
        });

        Self { at, token }
    }

    /// Instant at which the deadline expires.
    pub fn deadline(&self) -> Instant {
        self.at
    }

    /// Time left until the deadline; zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// True once the deadline passed (or the token was cancelled early).
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.at
    }

    /// Completes when the deadline is reached.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Token cancelled at the deadline, for APIs that take a [`CancellationToken`].
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_token_fires_at_deadline() {
        let d = Deadline::after(Duration::from_secs(1));
        assert!(!d.is_expired());
        assert_eq!(d.remaining(), Duration::from_secs(1));

        let started = Instant::now();
        d.cancelled().await;
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert!(d.is_expired());
        assert_eq!(d.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_token() {
        let d = Deadline::after(Duration::from_millis(200));
        let clone = d.clone();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(clone.token().is_cancelled());
        assert_eq!(clone.deadline(), d.deadline());
    }
}
