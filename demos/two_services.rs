//! Two simulated services hosted in one group.
//!
//! `ticker` works until cancelled, `flaky` fails after a few seconds unless you
//! press Ctrl-C first. Either way both shutdown handlers run, and the `slow`
//! one is abandoned once the 3s budget is spent.
//!
//! ```text
//! RUST_LOG=debug cargo run --example two_services
//! ```

use std::sync::Arc;
use std::time::Duration;

use rungroup::{
    BoxError, Config, Deadline, Group, LogWriter, ShutdownFn, ShutdownRef, Subscribe, TaskFn,
    TaskRef,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let ticker: TaskRef = TaskFn::arc("ticker", |ctx: CancellationToken| async move {
        let mut tick = tokio::time::interval(Duration::from_millis(500));
        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Ok::<_, BoxError>(()),
                _ = tick.tick() => tracing::info!("tick"),
            }
        }
    });

    let flaky: TaskRef = TaskFn::arc("flaky", |ctx: CancellationToken| async move {
        tokio::select! {
            _ = ctx.cancelled() => Ok(()),
            _ = tokio::time::sleep(Duration::from_secs(4)) => {
                Err::<(), BoxError>("upstream went away".into())
            }
        }
    });

    let ticker_stop: ShutdownRef = ShutdownFn::arc(|_d: Deadline| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, BoxError>(())
    });

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let group = Group::builder(Config::with_shutdown_budget(Duration::from_secs(3)))
        .with_subscribers(subs)
        .register(ticker, Some(ticker_stop))
        .register_fn(
            "slow",
            |ctx: CancellationToken| async move {
                ctx.cancelled().await;
                Ok::<_, BoxError>(())
            },
            |_d: Deadline| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, BoxError>(())
            },
        )
        .register_task(flaky)
        .build();

    let stopping = group.wait(CancellationToken::new()).await;
    if let Some(err) = stopping.errors() {
        tracing::warn!(%err, "run phase ended with an error");
    }

    match stopping.shutdown().await {
        Ok(()) => tracing::info!("stopped cleanly"),
        Err(err) => tracing::warn!(%err, "stopped with errors"),
    }
    Ok(())
}
