pub mod delete;
pub mod load;
pub mod purge;
pub mod redo;
pub mod search;
pub mod sources;
pub mod stats;

use std::path::Path;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use matchflow_engine::{JsonlSink, PumpOptions, PumpSummary, Reporter};

/// Cancel the token on Ctrl-C so pumps drain instead of dying mid-batch.
pub(crate) fn spawn_interrupt_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing in-flight work");
            cancel.cancel();
        }
    });
}

pub(crate) fn pump_options(workers: Option<usize>, stats_interval: Option<u64>) -> PumpOptions {
    let mut options = PumpOptions::default();
    if let Some(workers) = workers {
        options.workers = workers.max(1);
    }
    options.stats_interval = stats_interval;
    options
}

/// Reporter with an optional file sink for enriched responses and an
/// optional progress milestone override.
pub(crate) async fn reporter_for(
    operation: &'static str,
    output: Option<&Path>,
    progress_interval: Option<u64>,
) -> Result<Reporter> {
    let mut reporter = Reporter::new(operation);
    if let Some(interval) = progress_interval {
        reporter = reporter.with_progress_interval(interval);
    }
    Ok(match output {
        Some(path) => reporter.with_sink(JsonlSink::create(path).await?),
        None => reporter,
    })
}

/// The user-facing summary line shared by all batch commands.
pub(crate) fn print_summary(summary: &PumpSummary, output: Option<&Path>) {
    println!(
        "Successfully processed {} records, with {} errors",
        summary.succeeded, summary.failed
    );
    if let Some(path) = output {
        println!("With info responses written to {}", path.display());
    }
}
