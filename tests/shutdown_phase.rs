mod common;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rungroup::{
    BoxError, Config, Deadline, Event, EventKind, Group, RunnerError, SHUTDOWN_TIMEOUT_MSG,
    ShutdownFn, ShutdownRef, Subscribe,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use common::{assert_elapsed, drain, handler_after, until_cancelled};

fn cancelled() -> CancellationToken {
    let token = CancellationToken::new();
    token.cancel();
    token
}

#[tokio::test(start_paused = true)]
async fn budget_below_floor_is_raised_to_two_seconds() {
    let group = Group::builder(Config::with_shutdown_budget(Duration::from_millis(500)))
        .register(
            until_cancelled("stuck"),
            Some(handler_after(Duration::from_secs(60), Ok(()))),
        )
        .build();
    assert_eq!(group.config().shutdown_budget(), Duration::from_secs(2));

    let stopping = group.wait(cancelled()).await;
    let started = Instant::now();
    let err = stopping.shutdown().await.unwrap_err();
    assert_elapsed(started, Duration::from_secs(2));
    assert!(err.has_timeout());
}

#[tokio::test(start_paused = true)]
async fn slow_handler_is_abandoned_at_the_budget() {
    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(3)))
        .register(
            until_cancelled("fast"),
            Some(handler_after(Duration::from_millis(10), Ok(()))),
        )
        .register(
            until_cancelled("slow"),
            Some(handler_after(Duration::from_secs(10), Ok(()))),
        )
        .build();

    let stopping = group.wait(cancelled()).await;
    let started = Instant::now();
    let err = stopping.shutdown().await.unwrap_err();

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3), "returned early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "returned late: {elapsed:?}");
    assert!(err.to_string().contains(SHUTDOWN_TIMEOUT_MSG));
}

#[tokio::test(start_paused = true)]
async fn every_handler_error_is_reported() {
    let mut builder = Group::builder(Config::with_shutdown_budget(Duration::from_secs(3)));
    let messages = ["disk full", "pool busy", "socket closed", "lease lost"];
    for (i, msg) in messages.iter().copied().enumerate() {
        builder = builder.register(
            until_cancelled("svc"),
            Some(handler_after(Duration::from_millis(10 * (i as u64 + 1)), Err(msg))),
        );
    }
    let stopping = builder.build().wait(cancelled()).await;

    let err = stopping.shutdown().await.unwrap_err();
    assert_eq!(err.len(), messages.len());
    assert!(!err.has_timeout());

    let got: HashSet<String> = err.errors().iter().map(|e| e.to_string()).collect();
    let want: HashSet<String> = messages.iter().map(|m| m.to_string()).collect();
    assert_eq!(got, want);
    assert!(err.errors().iter().all(|e| matches!(e, RunnerError::Shutdown { .. })));

    // Completion order follows the handler delays.
    assert_eq!(
        err.to_string(),
        "multiple errors: (disk full) (pool busy) (socket closed) (lease lost)"
    );
}

#[tokio::test(start_paused = true)]
async fn no_handlers_means_immediate_ok() {
    let group = Group::builder(Config::default())
        .register_task(until_cancelled("a"))
        .register_task(until_cancelled("b"))
        .build();

    let stopping = group.wait(cancelled()).await;
    let started = Instant::now();
    assert!(stopping.shutdown().await.is_ok());
    assert_eq!(started.elapsed(), Duration::ZERO);
}

// Budget 3s; runner1 stops in 50ms, runner2 needs 5s; cancellation at t=0.
#[tokio::test(start_paused = true)]
async fn interrupt_then_partial_timeout_scenario() {
    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(3)))
        .register(
            until_cancelled("runner1"),
            Some(handler_after(Duration::from_millis(50), Ok(()))),
        )
        .register(
            until_cancelled("runner2"),
            Some(handler_after(Duration::from_secs(5), Ok(()))),
        )
        .build();

    let t0 = Instant::now();
    let stopping = group.wait(cancelled()).await;
    assert_eq!(t0.elapsed(), Duration::ZERO);

    let err = stopping.shutdown().await.unwrap_err();
    assert_elapsed(t0, Duration::from_secs(3));
    assert_eq!(err.len(), 1);

    match &err.errors()[0] {
        RunnerError::ShutdownTimeout { budget, pending } => {
            assert_eq!(*budget, Duration::from_secs(3));
            assert_eq!(pending.len(), 1);
            assert_eq!(&*pending[0], "runner2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "multiple errors: (shutdown timeout exceeded)");
}

#[tokio::test(start_paused = true)]
async fn timeout_error_comes_before_handler_errors() {
    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(2)))
        .register(
            until_cancelled("bad"),
            Some(handler_after(Duration::from_millis(100), Err("flush failed"))),
        )
        .register(
            until_cancelled("hung"),
            Some(handler_after(Duration::from_secs(30), Ok(()))),
        )
        .build();

    let err = group.wait(cancelled()).await.shutdown().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "multiple errors: (shutdown timeout exceeded) (flush failed)"
    );
}

#[tokio::test(start_paused = true)]
async fn handlers_get_the_inner_deadline() {
    let seen = Arc::new(Mutex::new(None));
    let record = Arc::clone(&seen);
    let handler: ShutdownRef = ShutdownFn::arc(move |deadline: Deadline| {
        let record = Arc::clone(&record);
        async move {
            *record.lock().unwrap() = Some(deadline.remaining());
            deadline.cancelled().await;
            Err::<(), BoxError>("gave up at deadline".into())
        }
    });

    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(3)))
        .register(until_cancelled("svc"), Some(handler))
        .build();

    let started = Instant::now();
    let err = group.wait(cancelled()).await.shutdown().await.unwrap_err();

    assert_eq!(*seen.lock().unwrap(), Some(Duration::from_secs(2)));
    // The handler honoured its deadline, so the group did not time out.
    assert_elapsed(started, Duration::from_secs(2));
    assert!(!err.has_timeout());
    assert_eq!(err.to_string(), "multiple errors: (gave up at deadline)");
}

#[tokio::test(start_paused = true)]
async fn panicking_handler_counts_as_pending() {
    let panicking: ShutdownRef = ShutdownFn::arc(|_deadline: Deadline| async {
        if true {
            panic!("handler blew up");
        }
        Ok::<_, BoxError>(())
    });

    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(2)))
        .register(until_cancelled("fragile"), Some(panicking))
        .build();

    let err = group.wait(cancelled()).await.shutdown().await.unwrap_err();
    match &err.errors()[0] {
        RunnerError::ShutdownTimeout { pending, .. } => {
            assert_eq!(pending.iter().map(|p| &**p).collect::<Vec<_>>(), vec!["fragile"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_phase_publishes_events() {
    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(2)))
        .register(
            until_cancelled("ok"),
            Some(handler_after(Duration::from_millis(10), Ok(()))),
        )
        .register(
            until_cancelled("err"),
            Some(handler_after(Duration::from_millis(20), Err("nope"))),
        )
        .register_task(until_cancelled("no-handler"))
        .build();
    let mut rx = group.subscribe();

    let stopping = group.wait(cancelled()).await;
    drain(&mut rx);
    assert!(stopping.shutdown().await.is_err());

    let kinds: Vec<EventKind> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::ShutdownStarting,
            EventKind::HandlerStopped,
            EventKind::HandlerFailed,
            EventKind::AllStoppedWithin,
        ]
    );
}

struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.kinds.lock().unwrap().push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test(start_paused = true)]
async fn subscribers_receive_the_whole_cycle() {
    let recorder = Arc::new(Recorder {
        kinds: Mutex::new(Vec::new()),
    });

    let group = Group::builder(Config::default())
        .register(
            until_cancelled("svc"),
            Some(handler_after(Duration::from_millis(10), Ok(()))),
        )
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    let stopping = group.wait(cancelled()).await;
    assert!(stopping.shutdown().await.is_ok());

    let kinds = recorder.kinds.lock().unwrap().clone();
    assert_eq!(kinds.first(), Some(&EventKind::RunStarting));
    assert!(kinds.contains(&EventKind::RunEnded));
    assert!(kinds.contains(&EventKind::HandlerStopped));
    assert_eq!(kinds.last(), Some(&EventKind::AllStoppedWithin));
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_the_timeout_before_shutdown_returns() {
    let recorder = Arc::new(Recorder {
        kinds: Mutex::new(Vec::new()),
    });

    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(2)))
        .register(
            until_cancelled("hung"),
            Some(handler_after(Duration::from_secs(30), Ok(()))),
        )
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    let err = group.wait(cancelled()).await.shutdown().await.unwrap_err();
    assert!(err.has_timeout());

    let kinds = recorder.kinds.lock().unwrap().clone();
    assert_eq!(
        kinds,
        vec![
            EventKind::RunStarting,
            EventKind::TaskStarted,
            EventKind::RunEnded,
            EventKind::ShutdownStarting,
            EventKind::ShutdownTimedOut,
        ]
    );
}
