use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use matchflow_engine::{DeleteRecords, JsonlFileSource, WorkPump};
use matchflow_sdk::{CallFlags, Environment};

/// Execute the `delete` command: pump a record file through `delete_record`.
pub async fn execute(
    env: &Environment,
    file: &Path,
    workers: Option<usize>,
    with_info: bool,
    output: Option<&Path>,
    progress_interval: Option<u64>,
) -> Result<()> {
    let flags = if with_info {
        CallFlags::with_info()
    } else {
        CallFlags::default()
    };

    let cancel = CancellationToken::new();
    super::spawn_interrupt_watcher(cancel.clone());

    let pump = WorkPump::new(Arc::new(DeleteRecords::new(env.engine(), flags)))
        .with_options(super::pump_options(workers, None))
        .with_cancellation(cancel);

    let mut source = JsonlFileSource::open(file).await?;
    let mut reporter = super::reporter_for("delete", output, progress_interval).await?;

    tracing::info!(file = %file.display(), "Starting delete");
    let summary = pump.run(&mut source, &mut reporter).await?;

    super::print_summary(&summary, output);
    Ok(())
}
