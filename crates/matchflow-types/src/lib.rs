//! Shared types for matchflow: record identities, the engine error model,
//! and the classified outcome of a single unit of work.

pub mod error;
pub mod outcome;
pub mod record;

pub use error::{Disposition, EngineError, ErrorCategory};
pub use outcome::Outcome;
pub use record::{RecordKey, RedoRecord};
