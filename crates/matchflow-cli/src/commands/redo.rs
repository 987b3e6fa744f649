use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use matchflow_engine::{ProcessRedoRecords, RedoSource, WorkPump};
use matchflow_sdk::{CallFlags, Environment};

/// Execute the `redo` command: a long-running service loop over the
/// engine's redo queue. Runs until interrupted; Ctrl-C drains in-flight
/// work and flushes the output sink before exiting.
pub async fn execute(
    env: &Environment,
    workers: Option<usize>,
    with_info: bool,
    output: Option<&Path>,
    poll_secs: u64,
    progress_interval: Option<u64>,
) -> Result<()> {
    let engine = env.engine();
    let flags = if with_info {
        CallFlags::with_info()
    } else {
        CallFlags::default()
    };

    let cancel = CancellationToken::new();
    super::spawn_interrupt_watcher(cancel.clone());

    let pump = WorkPump::new(Arc::new(ProcessRedoRecords::new(engine.clone(), flags)))
        .with_options(super::pump_options(workers, None))
        .with_cancellation(cancel.clone());

    let mut source =
        RedoSource::new(engine, cancel).with_poll_interval(Duration::from_secs(poll_secs.max(1)));
    let mut reporter = super::reporter_for("redo", output, progress_interval).await?;

    tracing::info!(poll_secs, "Starting continuous redo processing (Ctrl-C to exit)");
    let summary = pump.run(&mut source, &mut reporter).await?;

    super::print_summary(&summary, output);
    Ok(())
}
