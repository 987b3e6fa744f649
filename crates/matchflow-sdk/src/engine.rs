//! Resolution engine trait definitions.
//!
//! [`ResolutionEngine`] is the operational surface (record loading, search,
//! redo processing); [`ConfigManager`] is the configuration surface (data
//! source registration). Both are object-safe and blocking: calls are
//! expected to be driven from worker threads, not from async tasks
//! directly.

use matchflow_types::{EngineError, RecordKey, RedoRecord};

use crate::flags::CallFlags;

/// Operational contract of a resolution engine.
///
/// Implementations must be `Send + Sync`: matchflow shares one engine
/// handle across all workers and issues concurrent blocking calls against
/// it.
pub trait ResolutionEngine: Send + Sync {
    /// Load (or replace) a record.
    ///
    /// Returns the with-info response when `flags.with_info` is set,
    /// `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] with `BadInput` for rejected payloads and
    /// unknown data sources, a retryable category for transient repository
    /// conditions, and a fatal category otherwise.
    fn add_record(
        &self,
        key: &RecordKey,
        definition: &str,
        flags: CallFlags,
    ) -> Result<Option<String>, EngineError>;

    /// Delete a record. Deleting an absent record is a success (no-op).
    ///
    /// # Errors
    ///
    /// See [`ResolutionEngine::add_record`].
    fn delete_record(&self, key: &RecordKey, flags: CallFlags)
        -> Result<Option<String>, EngineError>;

    /// Search for entities matching a JSON attribute document.
    ///
    /// # Errors
    ///
    /// Returns `BadInput` for unparseable attribute documents.
    fn search_by_attributes(&self, attributes: &str) -> Result<String, EngineError>;

    /// Pull one record from the engine's redo queue.
    ///
    /// Returns `Ok(None)` when the queue is currently empty; emptiness is
    /// transient, not terminal.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on engine failure.
    fn get_redo_record(&self) -> Result<Option<RedoRecord>, EngineError>;

    /// Number of records currently waiting in the redo queue.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on engine failure.
    fn count_redo_records(&self) -> Result<u64, EngineError>;

    /// Process one redo record previously returned by
    /// [`ResolutionEngine::get_redo_record`].
    ///
    /// # Errors
    ///
    /// See [`ResolutionEngine::add_record`].
    fn process_redo_record(
        &self,
        record: &RedoRecord,
        flags: CallFlags,
    ) -> Result<Option<String>, EngineError>;

    /// Warm engine caches ahead of a batch run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on engine failure.
    fn prime(&self) -> Result<(), EngineError>;

    /// Engine workload statistics as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on engine failure.
    fn stats(&self) -> Result<String, EngineError>;

    /// Remove every record, entity, and queued redo item from the
    /// repository. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on engine failure.
    fn purge_repository(&self) -> Result<(), EngineError>;
}

/// Configuration contract of a resolution engine.
pub trait ConfigManager: Send + Sync {
    /// Register data sources, skipping ones already present. Returns the
    /// new default configuration id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on engine failure.
    fn register_data_sources(&self, names: &[String]) -> Result<i64, EngineError>;

    /// Currently registered data source names.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] on engine failure.
    fn data_sources(&self) -> Result<Vec<String>, EngineError>;

    /// Id of the configuration currently in effect.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when no configuration has been initialized.
    fn default_config_id(&self) -> Result<i64, EngineError>;
}
