//! Outcome accounting and the with-info output sink.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::PumpError;
use crate::result::PumpSummary;

const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// Append-only newline-delimited JSON sink for enriched responses.
///
/// Lines land in completion order, not submission order.
pub struct JsonlSink {
    name: String,
    writer: BufWriter<Box<dyn AsyncWrite + Send + Unpin>>,
    lines: u64,
}

impl JsonlSink {
    /// Create (truncate) an output file.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when the file cannot be created.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, PumpError> {
        let path = path.as_ref();
        let file = File::create(path)
            .await
            .with_context(|| format!("failed to create output file {}", path.display()))?;
        Ok(Self {
            name: path.display().to_string(),
            writer: BufWriter::new(Box::new(file)),
            lines: 0,
        })
    }

    /// Sink that writes lines to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            name: "stdout".to_string(),
            writer: BufWriter::new(Box::new(tokio::io::stdout())),
            lines: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn write_line(&mut self, line: &str) -> Result<(), PumpError> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .with_context(|| format!("failed to write to {}", self.name))?;
        self.writer
            .write_all(b"\n")
            .await
            .with_context(|| format!("failed to write to {}", self.name))?;
        self.lines += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), PumpError> {
        self.writer
            .flush()
            .await
            .with_context(|| format!("failed to flush {}", self.name))?;
        Ok(())
    }
}

/// Single-writer outcome accounting: counters, milestone progress lines,
/// and the optional with-info sink. Owned by the pump's coordinating task;
/// workers never touch it.
pub struct Reporter {
    operation: &'static str,
    succeeded: u64,
    failed: u64,
    progress_interval: u64,
    sink: Option<JsonlSink>,
}

impl Reporter {
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            succeeded: 0,
            failed: 0,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            sink: None,
        }
    }

    /// Route enriched responses to a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: JsonlSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Log a progress milestone every `interval` successes (default 100).
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Record one success, forwarding the enriched response when present.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when the sink write fails.
    pub async fn success(&mut self, info: Option<&str>) -> Result<(), PumpError> {
        self.succeeded += 1;
        if let (Some(sink), Some(info)) = (self.sink.as_mut(), info) {
            sink.write_line(info).await?;
        }
        if self.succeeded % self.progress_interval == 0 {
            tracing::info!(
                operation = self.operation,
                processed = self.succeeded,
                errors = self.failed,
                "Progress"
            );
        }
        Ok(())
    }

    /// Record one skipped failure.
    pub fn failure(&mut self) {
        self.failed += 1;
    }

    #[must_use]
    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Flush the sink and produce the final summary. Called on every exit
    /// path, including cancellation and fatal drains.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when the sink flush fails.
    pub async fn finish(&mut self, elapsed: Duration) -> Result<PumpSummary, PumpError> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush().await?;
            tracing::info!(
                operation = self.operation,
                lines = sink.lines,
                output = %sink.name,
                "Responses written"
            );
        }
        tracing::info!(
            operation = self.operation,
            processed = self.succeeded,
            errors = self.failed,
            "Run complete"
        );
        Ok(PumpSummary {
            succeeded: self.succeeded,
            failed: self.failed,
            duration_secs: elapsed.as_secs_f64(),
        })
    }
}
