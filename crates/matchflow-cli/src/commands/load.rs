use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use matchflow_engine::{AddRecords, ChannelSource, JsonlFileSource, WorkPump, spawn_file_producer};
use matchflow_sdk::{CallFlags, Environment};

/// Queue depth between the producer and the pump in `--via-queue` mode.
const QUEUE_CAPACITY: usize = 200;

/// Execute the `load` command: pump a record file through `add_record`.
#[allow(clippy::fn_params_excessive_bools, clippy::too_many_arguments)]
pub async fn execute(
    env: &Environment,
    file: &Path,
    workers: Option<usize>,
    with_info: bool,
    output: Option<&Path>,
    via_queue: bool,
    stats_interval: Option<u64>,
    progress_interval: Option<u64>,
) -> Result<()> {
    let engine = env.engine();

    // Warm engine caches before the batch hits it.
    let primer = engine.clone();
    tokio::task::spawn_blocking(move || primer.prime())
        .await
        .context("prime task panicked")?
        .context("failed to prime engine")?;

    let flags = if with_info {
        CallFlags::with_info()
    } else {
        CallFlags::default()
    };

    let cancel = CancellationToken::new();
    super::spawn_interrupt_watcher(cancel.clone());

    let mut pump = WorkPump::new(Arc::new(AddRecords::new(engine.clone(), flags)))
        .with_options(super::pump_options(workers, stats_interval))
        .with_cancellation(cancel);
    if stats_interval.is_some() {
        pump = pump.with_stats_probe(engine);
    }

    let mut reporter = super::reporter_for("add", output, progress_interval).await?;

    tracing::info!(file = %file.display(), via_queue, "Starting load");
    let summary = if via_queue {
        let (sender, mut source) = ChannelSource::bounded(QUEUE_CAPACITY);
        let producer = spawn_file_producer(file, sender);
        let summary = pump.run(&mut source, &mut reporter).await?;
        // Close the channel first so a drained-early producer can finish.
        drop(source);
        producer.await.context("producer task panicked")??;
        summary
    } else {
        let mut source = JsonlFileSource::open(file).await?;
        pump.run(&mut source, &mut reporter).await?
    };

    super::print_summary(&summary, output);
    Ok(())
}
