//! Work sources: where the pump pulls its items from.
//!
//! Sources hand out exactly one item per `next` call; the pump never reads
//! ahead of the slots it is refilling.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::PumpError;

/// One unit of input: a raw record payload, untouched until an operation
/// needs to look inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub payload: String,
}

impl WorkItem {
    #[must_use]
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Ordered stream of work items.
#[async_trait]
pub trait WorkSource: Send {
    /// Pull the next item. `Ok(None)` means the stream has ended; the pump
    /// will not call `next` again after that.
    async fn next(&mut self) -> Result<Option<WorkItem>, PumpError>;
}

/// Newline-delimited file source. Blank lines are skipped; EOF ends the
/// stream. Not restartable: reopen the file for a fresh run.
#[derive(Debug)]
pub struct JsonlFileSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl JsonlFileSource {
    /// Open a newline-delimited record file.
    ///
    /// # Errors
    ///
    /// Returns an infrastructure error when the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PumpError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .await
            .with_context(|| format!("failed to open input file {}", path.display()))?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WorkSource for JsonlFileSource {
    async fn next(&mut self) -> Result<Option<WorkItem>, PumpError> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .with_context(|| format!("failed to read from {}", self.path.display()))?;
            match line {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => {}
                Some(line) => return Ok(Some(WorkItem::new(line))),
            }
        }
    }
}

/// Bounded-queue source fed by an independent producer task. A closed
/// channel ends the stream.
pub struct ChannelSource {
    receiver: mpsc::Receiver<String>,
}

impl ChannelSource {
    #[must_use]
    pub fn new(receiver: mpsc::Receiver<String>) -> Self {
        Self { receiver }
    }

    /// A bounded channel pair sized for producer/consumer runs.
    #[must_use]
    pub fn bounded(capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, Self::new(receiver))
    }
}

#[async_trait]
impl WorkSource for ChannelSource {
    async fn next(&mut self) -> Result<Option<WorkItem>, PumpError> {
        Ok(self.receiver.recv().await.map(WorkItem::new))
    }
}

/// Spawn a producer that feeds a record file into a bounded channel,
/// blocking on backpressure. Returns the number of lines produced.
///
/// Dropping the consumer closes the channel and stops the producer early.
pub fn spawn_file_producer(
    path: impl AsRef<Path>,
    sender: mpsc::Sender<String>,
) -> JoinHandle<Result<u64, PumpError>> {
    let path = path.as_ref().to_path_buf();
    tokio::spawn(async move {
        let file = File::open(&path)
            .await
            .with_context(|| format!("failed to open input file {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();
        let mut produced = 0u64;
        while let Some(line) = lines
            .next_line()
            .await
            .with_context(|| format!("failed to read from {}", path.display()))?
        {
            if line.trim().is_empty() {
                continue;
            }
            if sender.send(line).await.is_err() {
                // Consumer hung up; nothing left to feed.
                break;
            }
            produced += 1;
        }
        Ok(produced)
    })
}
