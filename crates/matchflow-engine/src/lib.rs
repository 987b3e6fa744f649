//! Bounded concurrent batch driver for resolution engines.
//!
//! The [`WorkPump`](pump::WorkPump) keeps a fixed number of blocking engine
//! calls in flight, classifies every completion as success / malformed /
//! retryable / fatal, and keeps pulling from its [`WorkSource`](source::WorkSource)
//! until the stream ends, a fatal error lands, or the caller cancels.

pub mod error;
pub mod ops;
pub mod pump;
pub mod redo;
pub mod reporter;
pub mod result;
pub mod source;

pub use error::PumpError;
pub use ops::{AddRecords, DeleteRecords, ProcessRedoRecords, RecordOperation, SearchRecords};
pub use pump::{PumpOptions, WorkPump};
pub use redo::RedoSource;
pub use reporter::{JsonlSink, Reporter};
pub use result::PumpSummary;
pub use source::{spawn_file_producer, ChannelSource, JsonlFileSource, WorkItem, WorkSource};
