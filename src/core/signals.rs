//! # Scoped OS signal interception for the run phase.
//!
//! [`SignalScope`] listens for a termination request while it is alive:
//!
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! The listener is registered when the scope is installed and torn down when the
//! scope is dropped, so every exit path of the run phase releases it.
//!
//! ## Release
//! tokio keeps its process-level handler once a signal kind has been registered.
//! On Unix a conditional default handler is registered next to it (`signal-hook`):
//! while no scope is alive the flag is armed and the next SIGINT/SIGTERM runs the
//! default action, so the process terminates as if it had never been intercepted.
//! Scopes are counted; the flag is armed only when the last one is dropped.

use std::io;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Live signal listener; dropping it stops listening and hands the signals back.
#[derive(Debug)]
pub(crate) struct SignalScope {
    fired: CancellationToken,
    listener: JoinHandle<()>,
    _disposition: Disposition,
}

impl SignalScope {
    /// Registers the signal listeners and spawns the task that waits on them.
    ///
    /// Returns `Err` if the platform refuses the registration.
    pub(crate) fn install() -> io::Result<Self> {
        let signal = shutdown_signal()?;
        let disposition = Disposition::acquire()?;
        let fired = CancellationToken::new();

        let trip = fired.clone();
        let listener = tokio::spawn(async move {
            signal.await;
            trip.cancel();
        });

        Ok(Self {
            fired,
            listener,
            _disposition: disposition,
        })
    }

    /// Completes once a termination signal has been received.
    pub(crate) fn fired(&self) -> WaitForCancellationFuture<'_> {
        self.fired.cancelled()
    }
}

impl Drop for SignalScope {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[cfg(unix)]
fn shutdown_signal() -> io::Result<BoxFuture<'static, ()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(Box::pin(async move {
        tokio::select! {
            _ = sigint.recv()  => {},
            _ = sigterm.recv() => {},
        }
    }))
}

#[cfg(not(unix))]
fn shutdown_signal() -> io::Result<BoxFuture<'static, ()>> {
    Ok(Box::pin(async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }))
}

/// Counts live scopes and arms the default disposition when none is left.
#[derive(Debug)]
struct Disposition;

#[cfg(unix)]
mod disposition {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    use signal_hook::consts::{SIGINT, SIGTERM};

    struct State {
        /// True while no scope is alive; shared with the signal handlers.
        release: Option<Arc<AtomicBool>>,
        active: usize,
    }

    static STATE: Mutex<State> = Mutex::new(State {
        release: None,
        active: 0,
    });

    pub(super) fn acquire() -> io::Result<()> {
        let mut state = STATE.lock().unwrap_or_else(PoisonError::into_inner);
        if state.release.is_none() {
            let flag = Arc::new(AtomicBool::new(false));
            for sig in [SIGINT, SIGTERM] {
                signal_hook::flag::register_conditional_default(sig, Arc::clone(&flag))?;
            }
            state.release = Some(flag);
        }
        if let Some(flag) = &state.release {
            flag.store(false, Ordering::SeqCst);
        }
        state.active += 1;
        Ok(())
    }

    pub(super) fn release() {
        let mut state = STATE.lock().unwrap_or_else(PoisonError::into_inner);
        state.active = state.active.saturating_sub(1);
        if state.active == 0 {
            if let Some(flag) = &state.release {
                flag.store(true, Ordering::SeqCst);
            }
        }
    }

    #[cfg(test)]
    pub(super) fn is_released() -> bool {
        let state = STATE.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .release
            .as_ref()
            .is_none_or(|flag| flag.load(Ordering::SeqCst))
    }
}

#[cfg(not(unix))]
mod disposition {
    pub(super) fn acquire() -> std::io::Result<()> {
        Ok(())
    }

    pub(super) fn release() {}
}

impl Disposition {
    fn acquire() -> io::Result<Self> {
        disposition::acquire()?;
        Ok(Self)
    }
}

impl Drop for Disposition {
    fn drop(&mut self) {
        disposition::release();
    }
}
