//! Unit operations: one blocking engine call per work item.
//!
//! Each operation parses the payload only as far as diagnostics require,
//! makes exactly one engine call, and maps the result into an [`Outcome`].
//! No operation retries internally; retry accounting belongs to the pump.

use std::sync::Arc;

use matchflow_sdk::{CallFlags, ResolutionEngine};
use matchflow_types::{Outcome, RecordKey, RedoRecord};

use crate::source::WorkItem;

/// A fallible, blocking operation applied to one work item.
///
/// Invoked from worker threads; implementations must not block on anything
/// other than the engine call itself.
pub trait RecordOperation: Send + Sync {
    /// Apply the operation to one item and classify the result.
    fn invoke(&self, item: &WorkItem) -> Outcome;

    /// Short operation name for log lines ("add", "delete", ...).
    fn name(&self) -> &'static str;
}

/// Load records into the engine repository.
pub struct AddRecords {
    engine: Arc<dyn ResolutionEngine>,
    flags: CallFlags,
}

impl AddRecords {
    #[must_use]
    pub fn new(engine: Arc<dyn ResolutionEngine>, flags: CallFlags) -> Self {
        Self { engine, flags }
    }
}

impl RecordOperation for AddRecords {
    fn invoke(&self, item: &WorkItem) -> Outcome {
        match RecordKey::parse(&item.payload) {
            Ok(key) => self.engine.add_record(&key, &item.payload, self.flags).into(),
            Err(err) => Outcome::from_error(err),
        }
    }

    fn name(&self) -> &'static str {
        "add"
    }
}

/// Delete records from the engine repository.
pub struct DeleteRecords {
    engine: Arc<dyn ResolutionEngine>,
    flags: CallFlags,
}

impl DeleteRecords {
    #[must_use]
    pub fn new(engine: Arc<dyn ResolutionEngine>, flags: CallFlags) -> Self {
        Self { engine, flags }
    }
}

impl RecordOperation for DeleteRecords {
    fn invoke(&self, item: &WorkItem) -> Outcome {
        match RecordKey::parse(&item.payload) {
            Ok(key) => self.engine.delete_record(&key, self.flags).into(),
            Err(err) => Outcome::from_error(err),
        }
    }

    fn name(&self) -> &'static str {
        "delete"
    }
}

/// Search the repository with attribute documents; the search response is
/// the success payload.
pub struct SearchRecords {
    engine: Arc<dyn ResolutionEngine>,
}

impl SearchRecords {
    #[must_use]
    pub fn new(engine: Arc<dyn ResolutionEngine>) -> Self {
        Self { engine }
    }
}

impl RecordOperation for SearchRecords {
    fn invoke(&self, item: &WorkItem) -> Outcome {
        match self.engine.search_by_attributes(&item.payload) {
            Ok(results) => Outcome::Success { info: Some(results) },
            Err(err) => Outcome::from_error(err),
        }
    }

    fn name(&self) -> &'static str {
        "search"
    }
}

/// Process records pulled from the engine's redo queue.
pub struct ProcessRedoRecords {
    engine: Arc<dyn ResolutionEngine>,
    flags: CallFlags,
}

impl ProcessRedoRecords {
    #[must_use]
    pub fn new(engine: Arc<dyn ResolutionEngine>, flags: CallFlags) -> Self {
        Self { engine, flags }
    }
}

impl RecordOperation for ProcessRedoRecords {
    fn invoke(&self, item: &WorkItem) -> Outcome {
        let record = RedoRecord(item.payload.clone());
        self.engine.process_redo_record(&record, self.flags).into()
    }

    fn name(&self) -> &'static str {
        "redo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchflow_sdk::MemoryEngine;
    use matchflow_types::EngineError;

    fn engine() -> Arc<MemoryEngine> {
        Arc::new(MemoryEngine::with_data_sources(["CUSTOMERS"]))
    }

    #[test]
    fn add_classifies_unparseable_payload_as_malformed() {
        let op = AddRecords::new(engine(), CallFlags::default());
        let outcome = op.invoke(&WorkItem::new("{broken"));
        assert!(matches!(outcome, Outcome::MalformedInput(_)));

        // Deterministic: same payload, same classification.
        let again = op.invoke(&WorkItem::new("{broken"));
        assert_eq!(outcome, again);
    }

    #[test]
    fn add_success_carries_info_when_requested() {
        let op = AddRecords::new(engine(), CallFlags::with_info());
        let outcome = op.invoke(&WorkItem::new(
            r#"{"DATA_SOURCE":"CUSTOMERS","RECORD_ID":"1","NAME_FULL":"Edna Kusha"}"#,
        ));
        match outcome {
            Outcome::Success { info: Some(info) } => assert!(info.contains("AFFECTED_ENTITIES")),
            other => panic!("expected with-info success, got {other:?}"),
        }
    }

    #[test]
    fn retryable_engine_failure_maps_to_retryable() {
        let engine = engine();
        engine
            .fail_record("42", EngineError::timeout("ENGINE_TIMEOUT", "timed out"))
            .unwrap();
        let op = AddRecords::new(engine, CallFlags::default());
        let outcome = op.invoke(&WorkItem::new(r#"{"DATA_SOURCE":"CUSTOMERS","RECORD_ID":"42"}"#));
        assert!(matches!(outcome, Outcome::Retryable(_)));
    }

    #[test]
    fn search_returns_results_as_info() {
        let op = SearchRecords::new(engine());
        let outcome = op.invoke(&WorkItem::new(r#"{"NAME_FULL":"Robert Smith"}"#));
        match outcome {
            Outcome::Success { info: Some(info) } => assert!(info.contains("RESOLVED_ENTITIES")),
            other => panic!("expected search results, got {other:?}"),
        }
    }
}
