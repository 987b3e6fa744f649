use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use matchflow_engine::{JsonlFileSource, JsonlSink, Reporter, SearchRecords, WorkPump};
use matchflow_sdk::Environment;

/// Execute the `search` command: pump attribute documents through
/// `search_by_attributes`, writing one response per line.
pub async fn execute(
    env: &Environment,
    file: &Path,
    workers: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    let cancel = CancellationToken::new();
    super::spawn_interrupt_watcher(cancel.clone());

    let pump = WorkPump::new(Arc::new(SearchRecords::new(env.engine())))
        .with_options(super::pump_options(workers, None))
        .with_cancellation(cancel);

    let sink = match output {
        Some(path) => JsonlSink::create(path).await?,
        None => JsonlSink::stdout(),
    };
    let mut source = JsonlFileSource::open(file).await?;
    let mut reporter = Reporter::new("search").with_sink(sink);

    tracing::info!(file = %file.display(), "Starting search");
    let summary = pump.run(&mut source, &mut reporter).await?;

    println!(
        "Completed {} searches, with {} errors",
        summary.succeeded, summary.failed
    );
    if let Some(path) = output {
        println!("Search responses written to {}", path.display());
    }
    Ok(())
}
