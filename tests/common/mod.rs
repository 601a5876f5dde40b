#![allow(dead_code)]

use std::time::Duration;

use rungroup::{BoxError, Deadline, Event, ShutdownFn, ShutdownRef, TaskFn, TaskRef};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Task that runs until its token is cancelled.
pub fn until_cancelled(name: &'static str) -> TaskRef {
    TaskFn::arc(name, |ctx: CancellationToken| async move {
        ctx.cancelled().await;
        Ok::<_, BoxError>(())
    })
}

/// Task that fails right away with `msg`.
pub fn failing(name: &'static str, msg: &'static str) -> TaskRef {
    TaskFn::arc(name, move |_ctx: CancellationToken| async move {
        Err::<(), BoxError>(msg.into())
    })
}

/// Handler that sleeps `delay`, then returns `Ok` or `Err(msg)`.
pub fn handler_after(delay: Duration, outcome: Result<(), &'static str>) -> ShutdownRef {
    ShutdownFn::arc(move |_deadline: Deadline| async move {
        tokio::time::sleep(delay).await;
        outcome.map_err(|msg| -> BoxError { msg.into() })
    })
}

/// Cancels `token` after `delay`.
pub fn cancel_after(token: &CancellationToken, delay: Duration) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
    });
}

/// Drains everything currently buffered in `rx`.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

/// Asserts that `started.elapsed()` is `want`, allowing for timer tick rounding.
#[track_caller]
pub fn assert_elapsed(started: tokio::time::Instant, want: Duration) {
    let got = started.elapsed();
    assert!(
        got >= want && got < want + Duration::from_millis(5),
        "elapsed {got:?}, want {want:?}"
    );
}
