//! The bounded work pump.
//!
//! A single coordinating task keeps at most `workers` blocking engine
//! calls in flight: it fills a [`JoinSet`], waits for any completion,
//! classifies the outcome, and refills the freed slot from the source.
//! Workers only compute outcomes; all counters and the sink stay with the
//! coordinator.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use matchflow_sdk::ResolutionEngine;
use matchflow_types::{Disposition, EngineError, Outcome};

use crate::error::PumpError;
use crate::ops::RecordOperation;
use crate::reporter::Reporter;
use crate::result::PumpSummary;
use crate::source::{WorkItem, WorkSource};

/// Tuning knobs for a pump run.
#[derive(Debug, Clone)]
pub struct PumpOptions {
    /// Maximum operations in flight. Defaults to host parallelism.
    pub workers: usize,
    /// Fetch and log engine stats every N successes, when set.
    pub stats_interval: Option<u64>,
}

impl Default for PumpOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            stats_interval: None,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Bounded concurrent driver for one operation over one source.
pub struct WorkPump {
    operation: Arc<dyn RecordOperation>,
    options: PumpOptions,
    cancel: CancellationToken,
    stats_probe: Option<Arc<dyn ResolutionEngine>>,
}

impl WorkPump {
    #[must_use]
    pub fn new(operation: Arc<dyn RecordOperation>) -> Self {
        Self {
            operation,
            options: PumpOptions::default(),
            cancel: CancellationToken::new(),
            stats_probe: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PumpOptions) -> Self {
        self.options = options;
        self
    }

    /// Cooperative cancellation: checked at each iteration boundary;
    /// in-flight calls are drained, never interrupted.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Engine handle used for periodic stats fetches
    /// (see [`PumpOptions::stats_interval`]).
    #[must_use]
    pub fn with_stats_probe(mut self, engine: Arc<dyn ResolutionEngine>) -> Self {
        self.stats_probe = Some(engine);
        self
    }

    /// Drive the source to completion.
    ///
    /// Every consumed item yields exactly one outcome: successes and
    /// skippable failures are counted in the summary; the first fatal
    /// outcome stops intake, lets in-flight calls finish, and is returned
    /// as `Err(PumpError::Engine)`.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::Engine`] after a fatal engine outcome and
    /// [`PumpError::Infrastructure`] for source/sink I/O failures or
    /// panicked workers.
    pub async fn run(
        &self,
        source: &mut dyn WorkSource,
        reporter: &mut Reporter,
    ) -> Result<PumpSummary, PumpError> {
        let start = Instant::now();
        let workers = self.options.workers.max(1);
        let mut in_flight: JoinSet<(WorkItem, Outcome)> = JoinSet::new();
        let mut draining = self.cancel.is_cancelled();
        let mut fatal: Option<EngineError> = None;
        let mut pump_error: Option<PumpError> = None;

        while !draining && in_flight.len() < workers {
            match source.next().await {
                Ok(Some(item)) => self.submit(&mut in_flight, item),
                Ok(None) => break,
                Err(err) => {
                    pump_error = Some(err);
                    draining = true;
                }
            }
        }

        tracing::debug!(
            operation = self.operation.name(),
            workers,
            in_flight = in_flight.len(),
            "Pump started"
        );

        while let Some(joined) = in_flight.join_next().await {
            let (item, outcome) = match joined {
                Ok(completed) => completed,
                Err(e) => {
                    tracing::error!(
                        operation = self.operation.name(),
                        error = %e,
                        "Worker task panicked, draining in-flight work"
                    );
                    draining = true;
                    pump_error.get_or_insert(PumpError::Infrastructure(anyhow::anyhow!(
                        "worker task panicked: {e}"
                    )));
                    continue;
                }
            };

            match outcome {
                Outcome::Success { info } => {
                    reporter.success(info.as_deref()).await?;
                    if let Some(err) = self.maybe_probe_stats(reporter.succeeded()).await? {
                        tracing::error!(
                            operation = self.operation.name(),
                            error = %err,
                            "Fatal error fetching engine stats, draining in-flight work"
                        );
                        draining = true;
                        fatal.get_or_insert(err);
                    }
                }
                Outcome::MalformedInput(err) => {
                    tracing::error!(
                        operation = self.operation.name(),
                        error = %err,
                        record = %item.payload,
                        "Skipping malformed record"
                    );
                    reporter.failure();
                }
                Outcome::Retryable(err) => {
                    tracing::warn!(
                        operation = self.operation.name(),
                        error = %err,
                        record = %item.payload,
                        "Skipping record after transient engine failure"
                    );
                    reporter.failure();
                }
                Outcome::Fatal(err) => {
                    tracing::error!(
                        operation = self.operation.name(),
                        error = %err,
                        record = %item.payload,
                        "Fatal engine error, draining in-flight work"
                    );
                    draining = true;
                    fatal.get_or_insert(err);
                }
            }

            if !draining && self.cancel.is_cancelled() {
                tracing::info!(
                    operation = self.operation.name(),
                    "Cancellation requested, draining in-flight work"
                );
                draining = true;
            }

            if !draining {
                match source.next().await {
                    Ok(Some(item)) => self.submit(&mut in_flight, item),
                    Ok(None) => {} // Source exhausted; let the set shrink.
                    Err(err) => {
                        pump_error = Some(err);
                        draining = true;
                    }
                }
            }
        }

        let summary = reporter.finish(start.elapsed()).await?;
        if let Some(err) = fatal {
            return Err(PumpError::Engine(err));
        }
        if let Some(err) = pump_error {
            return Err(err);
        }
        Ok(summary)
    }

    fn submit(&self, in_flight: &mut JoinSet<(WorkItem, Outcome)>, item: WorkItem) {
        let operation = self.operation.clone();
        in_flight.spawn_blocking(move || {
            let outcome = operation.invoke(&item);
            (item, outcome)
        });
    }

    /// Fetch engine stats when a stats milestone is due. Transient
    /// failures are logged and dropped; a fatal failure is handed back to
    /// the run loop.
    async fn maybe_probe_stats(&self, succeeded: u64) -> Result<Option<EngineError>, PumpError> {
        let (Some(interval), Some(engine)) = (self.options.stats_interval, &self.stats_probe)
        else {
            return Ok(None);
        };
        if interval == 0 || succeeded % interval != 0 {
            return Ok(None);
        }

        let engine = engine.clone();
        let stats = tokio::task::spawn_blocking(move || engine.stats())
            .await
            .map_err(|e| PumpError::Infrastructure(anyhow::anyhow!("stats task panicked: {e}")))?;
        match stats {
            Ok(stats) => {
                tracing::info!(operation = self.operation.name(), stats = %stats, "Engine stats");
                Ok(None)
            }
            Err(err) if err.disposition() == Disposition::Retryable => {
                tracing::warn!(
                    operation = self.operation.name(),
                    error = %err,
                    "Failed to fetch engine stats"
                );
                Ok(None)
            }
            Err(err) => Ok(Some(err)),
        }
    }
}
