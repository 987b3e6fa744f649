//! Redo-queue work source.
//!
//! The engine maintains its own backlog of records needing follow-up
//! resolution. Unlike a file, an empty redo queue is a pause, not an end:
//! the source sleeps through the poll interval and asks again, forever,
//! until the caller cancels.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use matchflow_sdk::ResolutionEngine;

use crate::error::PumpError;
use crate::source::{WorkItem, WorkSource};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Long-running source over the engine's redo queue.
pub struct RedoSource {
    engine: Arc<dyn ResolutionEngine>,
    cancel: CancellationToken,
    poll_interval: Duration,
}

impl RedoSource {
    #[must_use]
    pub fn new(engine: Arc<dyn ResolutionEngine>, cancel: CancellationToken) -> Self {
        Self {
            engine,
            cancel,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// How long to pause when the queue is drained (default 30s).
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[async_trait]
impl WorkSource for RedoSource {
    /// Ends the stream only on cancellation; queue emptiness sleeps and
    /// re-polls.
    async fn next(&mut self) -> Result<Option<WorkItem>, PumpError> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(None);
            }

            let engine = self.engine.clone();
            let record = tokio::task::spawn_blocking(move || engine.get_redo_record())
                .await
                .map_err(|e| {
                    PumpError::Infrastructure(anyhow::anyhow!("redo poll task panicked: {e}"))
                })?
                .map_err(PumpError::Engine)?;

            match record {
                Some(record) => return Ok(Some(WorkItem::new(record.0))),
                None => {
                    tracing::info!(
                        pause_secs = self.poll_interval.as_secs(),
                        "No redo records to process, pausing before next poll"
                    );
                    tokio::select! {
                        () = self.cancel.cancelled() => return Ok(None),
                        () = tokio::time::sleep(self.poll_interval) => {}
                    }
                }
            }
        }
    }
}
